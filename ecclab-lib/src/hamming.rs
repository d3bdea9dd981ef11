//! Hamming single error correcting code.
//!
//! Codeword positions are 1-indexed. Positions that are powers of two carry
//! parity bits and every other position carries a data bit, in order. Parity
//! bit `p` covers every position with bit `p` set, using even parity.
//!
//! A non-zero syndrome in `1..=n` names the bit to flip. A syndrome beyond the
//! codeword length cannot name a bit and the codeword is dropped. Two-bit
//! errors usually produce an in-range syndrome and are silently mis-corrected;
//! that is a property of the code, not of this implementation.
use tracing::{debug, trace};

use crate::bits::BitSequence;
use crate::codec::Codec;
use crate::integrity::{DecodeResult, FixReport, Report};
use crate::{Error, Result};

fn is_parity_position(pos: usize) -> bool {
    pos.is_power_of_two()
}

/// Number of parity bits in a codeword of `n` bits, the smallest `r` such
/// that `2^r >= n + 1`.
#[must_use]
pub fn parity_bits_for_codeword(n: usize) -> usize {
    let mut r = 0;
    while (1usize << r) < n + 1 {
        r += 1;
    }
    r
}

/// Number of parity bits needed to protect `m` data bits, the smallest `r`
/// such that `m + r + 1 <= 2^r`.
#[must_use]
pub fn parity_bits_for_data(m: usize) -> usize {
    let mut r = 0;
    while m + r + 1 > (1usize << r) {
        r += 1;
    }
    r
}

/// XOR of the bits at every 1-indexed position with bit `p` set.
fn parity(code: &[bool], p: usize) -> bool {
    code.iter()
        .enumerate()
        .filter(|(idx, _)| (idx + 1) & p != 0)
        .fold(false, |acc, (_, &bit)| acc ^ bit)
}

/// Syndrome of `code` using `r` parity checks.
fn syndrome(code: &[bool], r: usize) -> usize {
    let mut syndrome = 0;
    for i in 0..r {
        let p = 1 << i;
        if parity(code, p) {
            syndrome |= p;
        }
    }
    syndrome
}

fn extract_data(code: &[bool]) -> BitSequence {
    code.iter()
        .enumerate()
        .filter(|(idx, _)| !is_parity_position(idx + 1))
        .map(|(_, &bit)| bit)
        .collect()
}

/// Encode `data` into a codeword.
///
/// # Errors
/// [Error::Empty] if there are no data bits.
pub fn encode(data: &BitSequence) -> Result<BitSequence> {
    if data.is_empty() {
        return Err(Error::Empty);
    }
    let m = data.len();
    let r = parity_bits_for_data(m);
    let n = m + r;

    let mut code = vec![false; n];
    let mut data_bits = data.iter();
    for pos in 1..=n {
        if !is_parity_position(pos) {
            code[pos - 1] = data_bits.next().unwrap_or(false);
        }
    }
    for i in 0..r {
        let p = 1 << i;
        // parity position is still zero so it does not contribute
        code[p - 1] = parity(&code, p);
    }
    trace!(m, r, n, "hamming encoded");

    Ok(BitSequence::from_bits(code))
}

/// Full decode details for a codeword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HammingDecode {
    /// Codeword length.
    pub n: usize,
    /// Number of parity bits.
    pub r: usize,
    pub syndrome: usize,
    pub result: DecodeResult,
}

impl HammingDecode {
    /// Structured record including the codeword parameters.
    #[must_use]
    pub fn report(&self) -> Report {
        let mut report = self.result.report();
        report.n = Some(self.n);
        report.r = Some(self.r);
        report.syndrome = Some(self.syndrome);
        report
    }

    #[must_use]
    pub fn fix(&self) -> Option<FixReport> {
        match &self.result {
            DecodeResult::Fix {
                position,
                corrected,
                ..
            } => Some(FixReport {
                position: *position,
                corrected_codeword: corrected.to_string(),
            }),
            _ => None,
        }
    }
}

/// Decode `codeword`, correcting a single bit error if the syndrome names one.
pub fn decode_report(codeword: &BitSequence) -> HammingDecode {
    let n = codeword.len();
    let r = parity_bits_for_codeword(n);
    if codeword.is_empty() {
        return HammingDecode {
            n,
            r,
            syndrome: 0,
            result: DecodeResult::malformed(Error::Empty),
        };
    }

    let syndrome = syndrome(codeword.as_slice(), r);
    trace!(n, r, syndrome, "syndrome computed");
    HammingDecode {
        n,
        r,
        syndrome,
        result: resolve(codeword, syndrome),
    }
}

/// Apply the decision rule for `syndrome` to `codeword`.
fn resolve(codeword: &BitSequence, syndrome: usize) -> DecodeResult {
    let n = codeword.len();
    match syndrome {
        0 => DecodeResult::Ok {
            payload: extract_data(codeword.as_slice()),
        },
        position if position <= n => {
            let corrected = codeword.with_flipped(position - 1);
            debug!("corrected bit at position {position}");
            DecodeResult::Fix {
                position,
                payload: extract_data(corrected.as_slice()),
                corrected,
            }
        }
        _ => {
            debug!(n, "syndrome {syndrome} is out of range; dropping");
            DecodeResult::Drop {
                syndrome,
                payload: extract_data(codeword.as_slice()),
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hamming;

impl Codec for Hamming {
    fn name(&self) -> &'static str {
        "hamming"
    }

    fn encode(&self, payload: &BitSequence) -> Result<BitSequence> {
        encode(payload)
    }

    fn decode(&self, frame: &BitSequence) -> DecodeResult {
        decode_report(frame).result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::{Diagnostic, Status};
    use test_case::test_case;

    fn bits(s: &str) -> BitSequence {
        BitSequence::parse(s).unwrap()
    }

    #[test_case(1, 1)]
    #[test_case(3, 2)]
    #[test_case(4, 3)]
    #[test_case(7, 3)]
    #[test_case(8, 4)]
    #[test_case(15, 4)]
    #[test_case(16, 5)]
    fn parity_bits_codeword(n: usize, r: usize) {
        assert_eq!(parity_bits_for_codeword(n), r);
    }

    #[test_case(1, 2)]
    #[test_case(4, 3)]
    #[test_case(11, 4)]
    #[test_case(12, 5)]
    #[test_case(26, 5)]
    fn parity_bits_data(m: usize, r: usize) {
        assert_eq!(parity_bits_for_data(m), r);
    }

    #[test]
    fn encode_7_4() {
        // data 1011 => p1 = d3^d5^d7 = 1^0^1 = 0, p2 = d3^d6^d7 = 1^1^1 = 1,
        // p4 = d5^d6^d7 = 0^1^1 = 0
        let code = encode(&bits("1011")).unwrap();
        assert_eq!(code.to_string(), "0110011");
    }

    #[test]
    fn encode_empty_is_err() {
        assert!(matches!(
            encode(&BitSequence::default()),
            Err(Error::Empty)
        ));
    }

    #[test]
    fn documented_codeword() {
        let zult = decode_report(&bits("1011001"));
        assert_eq!(zult.n, 7);
        assert_eq!(zult.r, 3);
        assert_eq!(zult.syndrome, 1);
        assert_eq!(
            zult.result,
            DecodeResult::Fix {
                position: 1,
                payload: bits("1001"),
                corrected: bits("0011001"),
            }
        );
        let fix = zult.fix().unwrap();
        assert_eq!(fix.position, 1);
        assert_eq!(fix.corrected_codeword, "0011001");

        // the corrected codeword is clean
        let zult = decode_report(&bits("0011001"));
        assert_eq!(zult.syndrome, 0);
        assert_eq!(zult.result, DecodeResult::Ok { payload: bits("1001") });
    }

    #[test]
    fn clean_codeword_is_ok() {
        let data = BitSequence::from_ascii("Hi!");
        let code = encode(&data).unwrap();
        assert_eq!(code.len(), 24 + 5);
        assert_eq!(Hamming.decode(&code), DecodeResult::Ok { payload: data });
    }

    #[test]
    fn corrects_every_single_bit() {
        for data in ["1", "1011", "11111111111", "101100111000111010"] {
            let data = bits(data);
            let code = encode(&data).unwrap();
            for idx in 0..code.len() {
                let zult = decode_report(&code.with_flipped(idx));
                assert_eq!(
                    zult.result,
                    DecodeResult::Fix {
                        position: idx + 1,
                        payload: data.clone(),
                        corrected: code.clone(),
                    },
                    "data={data} flip={idx}"
                );
            }
        }
    }

    #[test]
    fn out_of_range_syndrome_drops() {
        // n = 5, r = 3: flipping positions 2 and 4 gives syndrome 6 > 5
        let code = encode(&bits("10")).unwrap();
        assert_eq!(code.len(), 5);
        let noisy = code.with_flipped(1).with_flipped(3);
        let zult = decode_report(&noisy);
        assert_eq!(zult.syndrome, 6);
        assert_eq!(zult.result.status(), Status::Drop);
        // best effort data is still extracted
        assert_eq!(zult.result.payload(), Some(&bits("10")));
    }

    #[test]
    fn contrived_syndrome_drops() {
        let code = bits("1011001");
        let zult = resolve(&code, 8);
        assert_eq!(
            zult,
            DecodeResult::Drop {
                syndrome: 8,
                payload: bits("1001"),
            }
        );
    }

    #[test]
    fn double_error_is_miscorrected() {
        let data = bits("1011");
        let code = encode(&data).unwrap();
        // positions 3 and 5 => syndrome 3 ^ 5 = 6, in range
        let zult = decode_report(&code.with_flipped(2).with_flipped(4));
        assert_eq!(zult.syndrome, 6);
        assert_eq!(zult.result.status(), Status::Fix);
        assert_ne!(zult.result.payload(), Some(&data));
    }

    #[test]
    fn empty_codeword_is_error() {
        let zult = decode_report(&BitSequence::default());
        assert_eq!(zult.result.status(), Status::Error);
        assert!(matches!(
            zult.result.diagnostic(),
            Some(Diagnostic::Malformed(_))
        ));
    }

    #[test]
    fn fix_only_for_corrected_codewords() {
        assert!(decode_report(&bits("0011001")).fix().is_none());
        assert!(decode_report(&BitSequence::default()).fix().is_none());

        let zult = decode_report(&bits("0011001").with_flipped(6));
        assert_eq!(
            zult.fix(),
            Some(FixReport {
                position: 7,
                corrected_codeword: "0011001".to_string()
            })
        );
        assert_eq!(zult.fix(), zult.report().fix);
    }

    #[test]
    fn report_includes_parameters() {
        let report = decode_report(&bits("1011001")).report();
        assert_eq!(report.status, Status::Fix);
        assert_eq!(report.n, Some(7));
        assert_eq!(report.r, Some(3));
        assert_eq!(report.syndrome, Some(1));
        assert_eq!(report.data_bits.as_deref(), Some("1001"));
    }
}
