#![warn(clippy::pedantic)]

pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod reader;
pub mod source;

pub use config::{Compression, ReaderConfig};
pub use cursor::ByteCursor;
pub use engine::{DecodeSession, NextEvent};
pub use error::{CursorError, DecodeError};
pub use reader::{BoxedSource, IrStreamReader, Search};
pub use source::{ByteSource, ReaderSource};

pub use clp_wire::IrErrorCode;
