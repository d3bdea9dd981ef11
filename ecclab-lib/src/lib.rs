#![doc = include_str!("../README.md")]

mod error;

pub mod bits;
pub mod codec;
pub mod crc32;
pub mod fletcher;
pub mod hamming;
pub mod integrity;
#[cfg(feature = "serde")]
pub mod request;

pub use bits::BitSequence;
pub use codec::{Algorithm, Codec};
pub use error::{Error, Result};
pub use integrity::{DecodeResult, Diagnostic, Report, Status};
