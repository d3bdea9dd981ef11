//! CRC-32 (ISO-HDLC, reflected polynomial `0xEDB8_8320`).
//!
//! Frames are the payload bits followed by the 32-bit checksum, MSB first. The
//! codec only detects errors; it never corrects.
use tracing::{debug, trace};

use crate::bits::BitSequence;
use crate::codec::Codec;
use crate::integrity::{DecodeResult, Diagnostic};
use crate::Result;

/// Reflected generator polynomial.
pub const POLY: u32 = 0xEDB8_8320;
/// Width of the check region in bits.
pub const CHECK_LEN: usize = 32;

/// Byte-wise lookup table, computed at compile time.
pub static TABLE: [u32; 256] = make_table(POLY);

const fn make_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;
        while j < 8 {
            c = if c & 1 == 1 { poly ^ (c >> 1) } else { c >> 1 };
            j += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// Standard CRC-32 of `data`.
#[must_use]
pub fn checksum(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        crc = TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Crc32;

impl Crc32 {
    /// Verify the trailing checksum of `frame`.
    ///
    /// The frame must have at least [CHECK_LEN] bits and a byte-aligned payload.
    pub fn verify(frame: &BitSequence) -> DecodeResult {
        let (payload, check) = match frame.split_check(CHECK_LEN) {
            Ok(parts) => parts,
            Err(err) => return DecodeResult::malformed(err),
        };
        let bytes = match payload.to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => return DecodeResult::malformed(err),
        };
        // 32 bits always fit
        let received = check.value().unwrap_or_default() as u32;
        let computed = checksum(&bytes);
        trace!(
            bytes = bytes.len(),
            "crc computed={computed:#010x} received={received:#010x}"
        );

        if computed == received {
            DecodeResult::Ok { payload }
        } else {
            debug!("crc mismatch; frame rejected");
            DecodeResult::Error {
                diagnostic: Diagnostic::CrcMismatch { computed, received },
                payload: Some(payload),
            }
        }
    }

    /// Append the checksum to `payload`, first zero-padding it to whole bytes.
    pub fn seal(payload: &BitSequence) -> Result<BitSequence> {
        let (padded, padding) = payload.pad_to_multiple(8);
        if padding > 0 {
            debug!("padded payload with {padding} bits to complete bytes");
        }
        let crc = checksum(&padded.to_bytes()?);
        Ok(padded.concat(&BitSequence::from_value(u64::from(crc), CHECK_LEN)?))
    }
}

impl Codec for Crc32 {
    fn name(&self) -> &'static str {
        "crc32"
    }

    fn encode(&self, payload: &BitSequence) -> Result<BitSequence> {
        Self::seal(payload)
    }

    fn decode(&self, frame: &BitSequence) -> DecodeResult {
        Self::verify(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::Status;
    use test_case::test_case;

    #[test]
    fn known_vector() {
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn empty_input() {
        assert_eq!(checksum(b""), 0);
    }

    #[test]
    fn table_entries() {
        assert_eq!(TABLE[0], 0);
        assert_eq!(TABLE[1], 0x7707_3096);
        assert_eq!(TABLE[255], 0x2D02_EF8D);
    }

    #[test]
    fn matches_crc_crate() {
        let alg = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);
        for data in [&b""[..], b"a", b"hello world", &[0u8, 0xff, 0x10, 0x80]] {
            assert_eq!(checksum(data), alg.checksum(data), "data={data:?}");
        }
    }

    #[test]
    fn encode_then_verify() {
        let payload = BitSequence::from_ascii("123456789");
        let frame = Crc32::seal(&payload).unwrap();
        assert_eq!(frame.len(), payload.len() + CHECK_LEN);

        let (_, check) = frame.split_check(CHECK_LEN).unwrap();
        assert_eq!(check.value().unwrap(), 0xCBF4_3926);

        assert_eq!(Crc32::verify(&frame), DecodeResult::Ok { payload });
    }

    #[test]
    fn encode_pads_to_bytes() {
        let payload = BitSequence::parse("101").unwrap();
        let frame = Crc32::seal(&payload).unwrap();
        assert_eq!(frame.len(), 8 + CHECK_LEN);
        match Crc32::verify(&frame) {
            DecodeResult::Ok { payload } => assert_eq!(payload.to_string(), "10100000"),
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[test]
    fn only_checksum_is_ok() {
        // empty payload is byte aligned
        let frame = BitSequence::from_value(0, 32).unwrap();
        assert_eq!(Crc32::verify(&frame).status(), Status::Ok);
    }

    #[test]
    fn flipped_bit_is_error() {
        let payload = BitSequence::from_ascii("hola");
        let frame = Crc32::seal(&payload).unwrap();
        for idx in 0..frame.len() {
            let zult = Crc32::verify(&frame.with_flipped(idx));
            assert_eq!(zult.status(), Status::Error, "flip at {idx} not detected");
            assert!(matches!(
                zult.diagnostic(),
                Some(Diagnostic::CrcMismatch { .. })
            ));
        }
    }

    #[test_case("1010" ; "shorter than check")]
    #[test_case("101 00000000000000000000000000000000" ; "misaligned payload")]
    fn malformed(input: &str) {
        let frame = BitSequence::parse(input).unwrap();
        let zult = Crc32::verify(&frame);
        assert_eq!(zult.status(), Status::Error);
        assert!(matches!(zult.diagnostic(), Some(Diagnostic::Malformed(_))));
        assert!(zult.payload().is_none());
    }
}
