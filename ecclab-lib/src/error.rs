#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("empty frame")]
    Empty,
    #[error("not binary: found {found:?} at position {position}")]
    NotBinary { position: usize, found: char },

    /// Frame is shorter than the check region of the algorithm.
    #[error("frame too short: {actual} bits, need at least {minimum}")]
    TooShort { actual: usize, minimum: usize },
    /// Payload does not divide into whole blocks.
    #[error("payload of {len} bits is not a multiple of {width} bits")]
    Misaligned { len: usize, width: usize },
    #[error("value needs more than {max} bits, got {actual}")]
    TooWide { actual: usize, max: usize },

    #[error("unsupported block size {0}; must be 8, 16 or 32")]
    UnsupportedBlockSize(u32),
    #[error("unknown algorithm {0:?}")]
    UnknownAlgorithm(String),
    #[error("algorithm {0:?} requires an explicit block size")]
    MissingBlockSize(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
