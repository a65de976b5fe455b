//! Command implementations for OxiXml CLI.

pub mod compress;
pub mod decompress;
pub mod dump;
pub mod info;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use dump::cmd_dump;
pub use info::cmd_info;
