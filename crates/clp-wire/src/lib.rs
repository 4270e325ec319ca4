#![warn(clippy::pedantic)]

pub mod encoded_var;
pub mod error;
pub mod preamble;
pub mod protocol;
pub mod record;
pub mod status;

pub use error::WireError;
pub use preamble::{PreambleLayout, decode_preamble_header, detect_encoding_width};
pub use protocol::{EncodingWidth, IrErrorCode};
pub use record::{DecodedRecord, decode_one_record};
pub use status::DecodeStatus;
