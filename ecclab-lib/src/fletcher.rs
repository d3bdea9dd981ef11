//! Fletcher checksums over 8, 16 or 32 bit blocks.
//!
//! The payload is split into MSB-first blocks and two running sums are kept
//! modulo `2^block_size - 1`. The check region is both sums, `2 * block_size`
//! bits wide, appended after the payload.
//!
//! Two conventions vary between Fletcher implementations: the initial value of
//! the sums and the order they are written in. Both are explicit settings of
//! [FletcherConfig]; the defaults are sums starting at 0 and `sum2` written
//! before `sum1`.
//!
//! ```
//! use ecclab::bits::BitSequence;
//! use ecclab::fletcher::{BlockSize, Fletcher, FletcherConfig};
//!
//! let fletcher = Fletcher::new(FletcherConfig::new(BlockSize::Bits16));
//! let frame = fletcher.seal(&BitSequence::from_ascii("abcd")).unwrap();
//! assert!(fletcher.verify(&frame).is_ok());
//! ```
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use crate::bits::BitSequence;
use crate::codec::Codec;
use crate::integrity::{DecodeResult, Diagnostic};
use crate::{Error, Result};

/// Width of each summed block, and of each half of the check value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlockSize {
    Bits8,
    Bits16,
    Bits32,
}

impl BlockSize {
    #[must_use]
    pub fn bits(self) -> usize {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }

    /// Sums are kept modulo `2^bits - 1`.
    #[must_use]
    pub fn modulus(self) -> u64 {
        (1u64 << self.bits()) - 1
    }
}

impl TryFrom<u32> for BlockSize {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            8 => Ok(Self::Bits8),
            16 => Ok(Self::Bits16),
            32 => Ok(Self::Bits32),
            _ => Err(Error::UnsupportedBlockSize(value)),
        }
    }
}

/// Starting value of both running sums.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InitialSums {
    #[default]
    Zero,
    One,
}

impl InitialSums {
    fn value(self) -> u64 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

/// Order of the two sums in the check region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CheckOrder {
    /// `sum2` in the high half, `sum1` in the low half.
    #[default]
    Sum2Sum1,
    Sum1Sum2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FletcherConfig {
    pub block_size: BlockSize,
    #[builder(default)]
    pub initial_sums: InitialSums,
    #[builder(default)]
    pub order: CheckOrder,
}

impl FletcherConfig {
    /// Config for `block_size` using the default conventions.
    #[must_use]
    pub fn new(block_size: BlockSize) -> Self {
        Self::builder().block_size(block_size).build()
    }
}

/// The two running sums.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sums {
    pub sum1: u64,
    pub sum2: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fletcher {
    config: FletcherConfig,
}

impl Fletcher {
    #[must_use]
    pub fn new(config: FletcherConfig) -> Self {
        Self { config }
    }

    /// Classic Fletcher-16: 8-bit blocks with a 16-bit check value.
    #[must_use]
    pub fn fletcher16() -> Self {
        Self::new(FletcherConfig::new(BlockSize::Bits8))
    }

    #[must_use]
    pub fn config(&self) -> &FletcherConfig {
        &self.config
    }

    /// Width of the check region in bits.
    #[must_use]
    pub fn check_len(&self) -> usize {
        2 * self.config.block_size.bits()
    }

    /// Running sums over `payload`.
    ///
    /// # Errors
    /// [Error::Misaligned] if `payload` is not a whole number of blocks.
    pub fn sums(&self, payload: &BitSequence) -> Result<Sums> {
        let modulus = self.config.block_size.modulus();
        let init = self.config.initial_sums.value();
        let mut sums = Sums {
            sum1: init,
            sum2: init,
        };
        for (idx, block) in payload.blocks(self.config.block_size.bits())?.enumerate() {
            sums.sum1 = (sums.sum1 + block) % modulus;
            sums.sum2 = (sums.sum2 + sums.sum1) % modulus;
            trace!(
                block = idx,
                value = block,
                "sum1={} sum2={}",
                sums.sum1,
                sums.sum2
            );
        }
        Ok(sums)
    }

    fn check_value(&self, sums: Sums) -> Result<BitSequence> {
        let width = self.config.block_size.bits();
        let sum1 = BitSequence::from_value(sums.sum1, width)?;
        let sum2 = BitSequence::from_value(sums.sum2, width)?;
        Ok(match self.config.order {
            CheckOrder::Sum2Sum1 => sum2.concat(&sum1),
            CheckOrder::Sum1Sum2 => sum1.concat(&sum2),
        })
    }

    fn received_sums(&self, check: &BitSequence) -> Result<Sums> {
        let (high, low) = check.split_at(self.config.block_size.bits());
        let (high, low) = (high.value()?, low.value()?);
        Ok(match self.config.order {
            CheckOrder::Sum2Sum1 => Sums {
                sum1: low,
                sum2: high,
            },
            CheckOrder::Sum1Sum2 => Sums {
                sum1: high,
                sum2: low,
            },
        })
    }

    /// Verify the trailing check value of `frame`.
    pub fn verify(&self, frame: &BitSequence) -> DecodeResult {
        let (payload, check) = match frame.split_check(self.check_len()) {
            Ok(parts) => parts,
            Err(err) => return DecodeResult::malformed(err),
        };
        let computed = match self.sums(&payload) {
            Ok(sums) => sums,
            Err(err) => return DecodeResult::malformed(err),
        };
        let received = match self.received_sums(&check) {
            Ok(sums) => sums,
            Err(err) => return DecodeResult::malformed(err),
        };

        if computed == received {
            DecodeResult::Ok { payload }
        } else {
            debug!(?computed, ?received, "fletcher mismatch; frame rejected");
            DecodeResult::Error {
                diagnostic: Diagnostic::FletcherMismatch { computed, received },
                payload: Some(payload),
            }
        }
    }

    /// Append the check value to `payload`, first zero-padding it to whole
    /// blocks.
    pub fn seal(&self, payload: &BitSequence) -> Result<BitSequence> {
        let (padded, padding) = payload.pad_to_multiple(self.config.block_size.bits());
        if padding > 0 {
            debug!(
                "padded payload with {padding} bits to complete {}-bit blocks",
                self.config.block_size.bits()
            );
        }
        let sums = self.sums(&padded)?;
        Ok(padded.concat(&self.check_value(sums)?))
    }
}

impl Codec for Fletcher {
    fn name(&self) -> &'static str {
        match self.config.block_size {
            BlockSize::Bits8 => "fletcher-16",
            BlockSize::Bits16 => "fletcher-32",
            BlockSize::Bits32 => "fletcher-64",
        }
    }

    fn encode(&self, payload: &BitSequence) -> Result<BitSequence> {
        self.seal(payload)
    }

    fn decode(&self, frame: &BitSequence) -> DecodeResult {
        self.verify(frame)
    }
}
