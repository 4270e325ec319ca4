#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;
pub mod writer;

pub use encoder::IrEncoder;
pub use error::EncodeError;
pub use writer::{IrWriter, metadata_json};
