use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::BitSequence;
use crate::fletcher::Sums;

/// The possible decode dispositions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Status {
    /// No error was found.
    Ok,
    /// A single bit error was corrected.
    Fix,
    /// Errors were detected that could not be corrected.
    Drop,
    /// Input was malformed or failed its check.
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::Fix => "FIX",
            Self::Drop => "DROP",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Why a frame was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// The frame did not satisfy the algorithm's shape constraints.
    Malformed(String),
    CrcMismatch {
        computed: u32,
        received: u32,
    },
    FletcherMismatch {
        computed: Sums,
        received: Sums,
    },
}

impl From<crate::Error> for Diagnostic {
    fn from(err: crate::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "malformed frame: {reason}"),
            Self::CrcMismatch { computed, received } => write!(
                f,
                "crc mismatch: computed {computed:#010x}, received {received:#010x}"
            ),
            Self::FletcherMismatch { computed, received } => write!(
                f,
                "checksum mismatch: computed sum1={}, sum2={}; received sum1={}, sum2={}",
                computed.sum1, computed.sum2, received.sum1, received.sum2
            ),
        }
    }
}

/// Outcome of decoding a single frame.
///
/// Decoding never fails; malformed input and failed checks are reported as
/// [DecodeResult::Error] so the caller can log and discard the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeResult {
    Ok {
        payload: BitSequence,
    },
    Fix {
        /// 1-indexed position of the corrected bit.
        position: usize,
        payload: BitSequence,
        /// The full codeword after correction.
        corrected: BitSequence,
    },
    Drop {
        syndrome: usize,
        /// Best-effort payload extracted without correction.
        payload: BitSequence,
    },
    Error {
        diagnostic: Diagnostic,
        /// Payload region as received, when the frame was well formed.
        payload: Option<BitSequence>,
    },
}

impl DecodeResult {
    pub(crate) fn malformed(err: crate::Error) -> Self {
        Self::Error {
            diagnostic: err.into(),
            payload: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Ok { .. } => Status::Ok,
            Self::Fix { .. } => Status::Fix,
            Self::Drop { .. } => Status::Drop,
            Self::Error { .. } => Status::Error,
        }
    }

    /// Return `true` if [Self::Ok] or [Self::Fix]. Any other value will return `false`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. } | Self::Fix { .. })
    }

    /// The recovered payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&BitSequence> {
        match self {
            Self::Ok { payload } | Self::Fix { payload, .. } | Self::Drop { payload, .. } => {
                Some(payload)
            }
            Self::Error { payload, .. } => payload.as_ref(),
        }
    }

    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Error { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }

    /// Structured record of this result. Codeword parameters are left unset;
    /// see [crate::hamming::HammingDecode::report] for those.
    #[must_use]
    pub fn report(&self) -> Report {
        let fix = match self {
            Self::Fix {
                position,
                corrected,
                ..
            } => Some(FixReport {
                position: *position,
                corrected_codeword: corrected.to_string(),
            }),
            _ => None,
        };
        Report {
            status: self.status(),
            data_bits: self.payload().map(ToString::to_string),
            n: None,
            r: None,
            syndrome: None,
            fix,
            diagnostic: self.diagnostic().map(ToString::to_string),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixReport {
    pub position: usize,
    pub corrected_codeword: String,
}

/// Flat, serializable view of a [DecodeResult].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Report {
    pub status: Status,
    pub data_bits: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub n: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub r: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub syndrome: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fix: Option<FixReport>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub diagnostic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitSequence {
        BitSequence::parse(s).unwrap()
    }

    #[test]
    fn status_display() {
        assert_eq!(Status::Ok.to_string(), "OK");
        assert_eq!(Status::Fix.to_string(), "FIX");
        assert_eq!(Status::Drop.to_string(), "DROP");
        assert_eq!(Status::Error.to_string(), "ERROR");
    }

    #[test]
    fn is_ok() {
        assert!(DecodeResult::Ok { payload: bits("1") }.is_ok());
        assert!(DecodeResult::Fix {
            position: 1,
            payload: bits("1"),
            corrected: bits("111"),
        }
        .is_ok());
        assert!(!DecodeResult::Drop {
            syndrome: 7,
            payload: bits("1"),
        }
        .is_ok());
        assert!(!DecodeResult::malformed(crate::Error::Empty).is_ok());
    }

    #[test]
    fn report_for_fix() {
        let zult = DecodeResult::Fix {
            position: 1,
            payload: bits("1001"),
            corrected: bits("0011001"),
        };
        let report = zult.report();
        assert_eq!(report.status, Status::Fix);
        assert_eq!(report.data_bits.as_deref(), Some("1001"));
        assert_eq!(
            report.fix,
            Some(FixReport {
                position: 1,
                corrected_codeword: "0011001".to_string()
            })
        );
        assert!(report.diagnostic.is_none());
    }

    #[test]
    fn report_for_error() {
        let zult = DecodeResult::Error {
            diagnostic: Diagnostic::CrcMismatch {
                computed: 1,
                received: 2,
            },
            payload: None,
        };
        let report = zult.report();
        assert_eq!(report.status, Status::Error);
        assert!(report.data_bits.is_none());
        assert_eq!(
            report.diagnostic.as_deref(),
            Some("crc mismatch: computed 0x00000001, received 0x00000002")
        );
    }
}
