mod errors;
mod image_ops;
mod models;
mod session;

pub use errors::SessionError;
pub use image_ops::{decode, encode_png, lighten, FILTER_TINT};
pub use models::{CurrentImage, ImageSession, SelectOutcome};
