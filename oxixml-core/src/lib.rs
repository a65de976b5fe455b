//! # OxiXml Core
//!
//! Core components shared by the OxiXml crates.
//!
//! - [`error`]: Error types
//! - [`cursor`]: Bounds-checked byte reader
//! - [`width`]: Fixed-width id and scalar encoding
//!
//! ## Architecture
//!
//! OxiXml is layered the same way the rest of the toolchain is:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Container / CLI                                     │
//! │     header + five compressed sections, `oxixml` binary  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Structure                                           │
//! │     dictionaries, value typing, token stream            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Codec                                               │
//! │     LZ77 match finder + adaptive range coder            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Core (this crate)                                   │
//! │     errors, ByteCursor, IdWidth                         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxixml_core::{ByteCursor, IdWidth};
//!
//! let width = IdWidth::for_count(300);
//! assert_eq!(width, IdWidth::Two);
//!
//! let mut out = Vec::new();
//! width.write_id(&mut out, 299);
//! let mut cursor = ByteCursor::new(&out);
//! assert_eq!(width.read_id(&mut cursor).unwrap(), 299);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cursor;
pub mod error;
pub mod width;

// Re-exports for convenience
pub use cursor::ByteCursor;
pub use error::{OxiXmlError, Result};
pub use width::IdWidth;
