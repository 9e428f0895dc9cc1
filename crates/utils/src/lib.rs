pub mod checksum;
pub mod path;
pub mod errors;

pub use checksum::*;
pub use path::*;
pub use errors::*;
