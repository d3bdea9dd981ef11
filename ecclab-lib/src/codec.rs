use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bits::BitSequence;
use crate::crc32::Crc32;
use crate::fletcher::{BlockSize, Fletcher, FletcherConfig};
use crate::hamming::{self, Hamming};
use crate::integrity::{DecodeResult, Report};
use crate::{Error, Result};

/// A frame codec.
///
/// Implementations hold no mutable state and may be shared across threads.
pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce a frame carrying `payload`.
    ///
    /// # Errors
    /// If the payload cannot be represented by this codec.
    fn encode(&self, payload: &BitSequence) -> Result<BitSequence>;

    /// Check, and where possible correct, a received frame.
    fn decode(&self, frame: &BitSequence) -> DecodeResult;
}

/// All supported algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Algorithm {
    Crc32,
    Fletcher(FletcherConfig),
    /// Classic Fletcher-16 over 8-bit blocks.
    Fletcher16,
    Hamming,
}

impl Algorithm {
    /// Names accepted by [Algorithm::from_name].
    pub const NAMES: [&'static str; 5] = ["crc", "crc32", "fletcher", "fletcher16", "hamming"];

    /// Resolve an algorithm by name.
    ///
    /// `fletcher` requires `block_size`; it is ignored by the other algorithms.
    ///
    /// # Errors
    /// [Error::UnknownAlgorithm] for an unknown name, [Error::MissingBlockSize]
    /// for `fletcher` without a block size, or [Error::UnsupportedBlockSize].
    pub fn from_name(name: &str, block_size: Option<u32>) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "crc" | "crc32" | "crc-32" => Ok(Self::Crc32),
            "hamming" => Ok(Self::Hamming),
            "fletcher16" | "fletcher-16" => Ok(Self::Fletcher16),
            "fletcher" => {
                let Some(size) = block_size else {
                    return Err(Error::MissingBlockSize(name.to_string()));
                };
                Ok(Self::Fletcher(FletcherConfig::new(BlockSize::try_from(
                    size,
                )?)))
            }
            _ => Err(Error::UnknownAlgorithm(name.to_string())),
        }
    }

    #[must_use]
    pub fn codec(&self) -> Box<dyn Codec> {
        match self {
            Self::Crc32 => Box::new(Crc32),
            Self::Fletcher(config) => Box::new(Fletcher::new(*config)),
            Self::Fletcher16 => Box::new(Fletcher::fletcher16()),
            Self::Hamming => Box::new(Hamming),
        }
    }

    /// See [Codec::encode].
    ///
    /// # Errors
    /// If the payload cannot be encoded.
    pub fn encode(&self, payload: &BitSequence) -> Result<BitSequence> {
        self.codec().encode(payload)
    }

    pub fn decode(&self, frame: &BitSequence) -> DecodeResult {
        let zult = self.codec().decode(frame);
        debug!(algorithm = %self, status = %zult.status(), bits = frame.len(), "decoded");
        zult
    }

    /// Decode `frame` into a structured report. Hamming reports also carry
    /// the codeword length, parity bit count and syndrome.
    pub fn report(&self, frame: &BitSequence) -> Report {
        match self {
            Self::Hamming => {
                let decoded = hamming::decode_report(frame);
                debug!(
                    algorithm = %self,
                    status = %decoded.result.status(),
                    bits = frame.len(),
                    "decoded"
                );
                decoded.report()
            }
            alg => alg.decode(frame).report(),
        }
    }

    /// Parse `text` as a frame and decode it. Text that is not a frame is
    /// reported as a malformed result.
    pub fn decode_text(&self, text: &str) -> DecodeResult {
        match BitSequence::parse(text) {
            Ok(frame) => self.decode(&frame),
            Err(err) => {
                debug!(algorithm = %self, "invalid frame text: {err}");
                DecodeResult::malformed(err)
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crc32 => f.write_str("crc32"),
            Self::Fletcher16 => f.write_str("fletcher16"),
            Self::Hamming => f.write_str("hamming"),
            Self::Fletcher(config) => write!(f, "fletcher{}", config.block_size.bits()),
        }
    }
}
