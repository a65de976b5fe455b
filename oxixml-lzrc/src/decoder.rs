//! LZ stream decoding.

use crate::model::{LzModels, ceil_log2};
use crate::range_coder::RangeDecoder;
use crate::{
    FLAG_END_OF_STREAM, FLAG_LITERAL, FLAG_MATCH, LONG_OFFSET_SYMBOL, MAX_OFFSET,
    MAX_OFFSET_BITS,
};
use oxixml_core::error::{OxiXmlError, Result};
use tracing::trace;

/// LZ decoder for one self-terminating stream.
#[derive(Debug)]
pub struct LzDecoder<'a> {
    rc: RangeDecoder<'a>,
    models: LzModels,
    start: usize,
}

impl<'a> LzDecoder<'a> {
    /// Start decoding the stream that begins at `start` in `source`.
    pub fn new(source: &'a [u8], start: usize) -> Result<Self> {
        Ok(Self {
            rc: RangeDecoder::new(source, start)?,
            models: LzModels::new(),
            start,
        })
    }

    fn decode_offset(&mut self) -> Result<usize> {
        let symbol = self.rc.decode_symbol(&mut self.models.offset)?;
        if symbol == LONG_OFFSET_SYMBOL {
            let extra = self.rc.decode_direct_bits(MAX_OFFSET_BITS)?;
            let offset = LONG_OFFSET_SYMBOL + extra as usize;
            // Also bounds the length model index
            if offset >= MAX_OFFSET {
                return Err(OxiXmlError::corrupted(
                    self.rc.position(),
                    format!("match offset {offset} outside the {MAX_OFFSET}-byte window"),
                ));
            }
            Ok(offset)
        } else {
            Ok(symbol)
        }
    }

    /// Decode until the end-of-stream flag.
    ///
    /// Returns the bytes and the position just past this stream.
    pub fn decompress(mut self) -> Result<(Vec<u8>, usize)> {
        let mut out = Vec::new();

        loop {
            match self.rc.decode_symbol(&mut self.models.flag)? {
                FLAG_LITERAL => {
                    let byte = self.rc.decode_symbol(&mut self.models.literal)?;
                    out.push(byte as u8);
                }
                FLAG_MATCH => {
                    let offset = self.decode_offset()?;
                    let bucket = ceil_log2(offset as u32);
                    let length = self.rc.decode_symbol(&mut self.models.length[bucket])?;

                    if offset == 0 || offset > out.len() {
                        return Err(OxiXmlError::corrupted(
                            self.rc.position(),
                            format!(
                                "match offset {offset} exceeds {} decoded bytes",
                                out.len()
                            ),
                        ));
                    }

                    // Byte by byte: the source may overlap the bytes being written
                    let from = out.len() - offset;
                    for i in 0..length {
                        out.push(out[from + i]);
                    }
                }
                FLAG_END_OF_STREAM => break,
                _ => unreachable!("flag alphabet has three symbols"),
            }
        }

        let end = self.rc.position();
        trace!(
            input = end - self.start,
            output = out.len(),
            "lz stream decoded"
        );
        Ok((out, end))
    }
}
