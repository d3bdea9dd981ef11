//! Bit sequences and the `0`/`1` frame text format.
//!
//! Every codec in this crate consumes and produces [BitSequence]s. Text is
//! always read and written most-significant bit first, so `"10"` is the value
//! 2 and the first character is bit index 0.
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::{Error, Result};

/// An ordered, finite sequence of bits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitSequence {
    bits: Vec<bool>,
}

impl BitSequence {
    /// Parse frame text, ignoring any whitespace.
    ///
    /// # Errors
    /// [Error::Empty] if there are no bits after stripping whitespace, and
    /// [Error::NotBinary] for the first character that is not `0` or `1`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut bits = Vec::with_capacity(text.len());
        for (position, found) in text.chars().filter(|c| !c.is_whitespace()).enumerate() {
            match found {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return Err(Error::NotBinary { position, found }),
            }
        }
        if bits.is_empty() {
            return Err(Error::Empty);
        }
        Ok(Self { bits })
    }

    #[must_use]
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Bits of `bytes`, MSB first.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bits = bytes
            .iter()
            .flat_map(|b| (0..8).rev().map(move |i| (b >> i) & 1 == 1))
            .collect();
        Self { bits }
    }

    /// Bits of each character's low byte, 8 bits per character.
    ///
    /// Characters outside of Latin-1 are truncated to their low 8 bits, as they
    /// cannot be represented in a single byte.
    #[must_use]
    pub fn from_ascii(text: &str) -> Self {
        let bytes: Vec<u8> = text.chars().map(|c| (u32::from(c) & 0xff) as u8).collect();
        Self::from_bytes(&bytes)
    }

    /// Fixed-width, MSB-first rendering of `value`.
    ///
    /// # Errors
    /// [Error::TooWide] if `width` is greater than 64.
    pub fn from_value(value: u64, width: usize) -> Result<Self> {
        if width > 64 {
            return Err(Error::TooWide {
                actual: width,
                max: 64,
            });
        }
        let bits = (0..width).rev().map(|i| (value >> i) & 1 == 1).collect();
        Ok(Self { bits })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit at the 0-based `index`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Split into the first `mid` bits and the rest.
    ///
    /// # Panics
    /// If `mid > self.len()`.
    #[must_use]
    pub fn split_at(&self, mid: usize) -> (BitSequence, BitSequence) {
        let (head, tail) = self.bits.split_at(mid);
        (Self::from_bits(head.to_vec()), Self::from_bits(tail.to_vec()))
    }

    /// Split off a trailing check region of `width` bits, returning
    /// `(payload, check)`.
    ///
    /// # Errors
    /// [Error::TooShort] if there are fewer than `width` bits.
    pub fn split_check(&self, width: usize) -> Result<(BitSequence, BitSequence)> {
        if self.len() < width {
            return Err(Error::TooShort {
                actual: self.len(),
                minimum: width,
            });
        }
        Ok(self.split_at(self.len() - width))
    }

    /// MSB-first integer value of all bits.
    ///
    /// # Errors
    /// [Error::TooWide] for more than 64 bits.
    pub fn value(&self) -> Result<u64> {
        if self.len() > 64 {
            return Err(Error::TooWide {
                actual: self.len(),
                max: 64,
            });
        }
        Ok(fold(&self.bits))
    }

    /// MSB-first values of consecutive `width`-bit blocks.
    ///
    /// # Errors
    /// [Error::Misaligned] if the length is not a multiple of `width`, and
    /// [Error::TooWide] if `width` is 0 or greater than 64.
    pub fn blocks(&self, width: usize) -> Result<impl Iterator<Item = u64> + '_> {
        if width == 0 || width > 64 {
            return Err(Error::TooWide {
                actual: width,
                max: 64,
            });
        }
        if self.len() % width != 0 {
            return Err(Error::Misaligned {
                len: self.len(),
                width,
            });
        }
        Ok(self.bits.chunks_exact(width).map(fold))
    }

    /// Pack into bytes, MSB first.
    ///
    /// # Errors
    /// [Error::Misaligned] if the length is not a multiple of 8.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        // fold of 8 bits always fits in a byte
        Ok(self.blocks(8)?.map(|v| v as u8).collect())
    }

    /// Decode 8-bit groups as characters. A trailing partial group is ignored.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        self.bits
            .chunks_exact(8)
            .map(|chunk| char::from(fold(chunk) as u8))
            .collect()
    }

    /// A copy with the bit at 0-based `index` inverted.
    ///
    /// # Panics
    /// If `index` is out of range.
    #[must_use]
    pub fn with_flipped(&self, index: usize) -> Self {
        let mut bits = self.bits.clone();
        bits[index] = !bits[index];
        Self { bits }
    }

    /// A copy extended with zeros to the next multiple of `width`, and the
    /// number of zeros added.
    #[must_use]
    pub fn pad_to_multiple(&self, width: usize) -> (Self, usize) {
        let padding = if width == 0 {
            0
        } else {
            (width - self.len() % width) % width
        };
        let mut bits = self.bits.clone();
        bits.resize(bits.len() + padding, false);
        (Self { bits }, padding)
    }

    /// Concatenation of `self` followed by `other`.
    #[must_use]
    pub fn concat(&self, other: &BitSequence) -> Self {
        let mut bits = Vec::with_capacity(self.len() + other.len());
        bits.extend_from_slice(&self.bits);
        bits.extend_from_slice(&other.bits);
        Self { bits }
    }
}

fn fold(bits: &[bool]) -> u64 {
    bits.iter().fold(0u64, |acc, &b| (acc << 1) | u64::from(b))
}

impl FromStr for BitSequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
        f.write_str(&s)
    }
}

impl From<Vec<bool>> for BitSequence {
    fn from(bits: Vec<bool>) -> Self {
        Self::from_bits(bits)
    }
}

impl FromIterator<bool> for BitSequence {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self::from_bits(iter.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for BitSequence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for BitSequence {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Read a frame from the first non-blank line of `reader`.
///
/// # Errors
/// [Error::Io] if reading fails, [Error::Empty] if there is no non-blank line,
/// or any parse error for the line.
pub fn read_frame<R: BufRead>(reader: R) -> Result<BitSequence> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        return BitSequence::parse(&line);
    }
    Err(Error::Empty)
}
