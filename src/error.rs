use thiserror::Error;

/// A problem found inside one shifted run, independent of where the run sits
/// in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("run is empty once sentinel padding is removed")]
    Empty,

    #[error("run carries {0} octets, which is not a whole number of UTF-16 code units")]
    OddOctets(usize),

    #[error("bad base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unpaired surrogate {0:#06x}")]
    UnpairedSurrogate(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Sfdutf7Error {
    #[error("Malformed base64 run at byte {offset}: {reason}")]
    MalformedBase64Run {
        offset: usize,
        #[source]
        reason: RunError,
    },

    #[error("Invalid surrogate pair in run at byte {offset}: unpaired code unit {unit:#06x}")]
    InvalidSurrogatePair { offset: usize, unit: u16 },

    #[error("Code point {scalar:#x} has no UTF-16 representation")]
    NonRepresentableScalar { scalar: u32 },
}

impl Sfdutf7Error {
    /// Places a run-level failure at `offset` in the decoder's input.
    pub(crate) fn in_run(offset: usize, err: RunError) -> Self {
        match err {
            RunError::UnpairedSurrogate(unit) => {
                Sfdutf7Error::InvalidSurrogatePair { offset, unit }
            }
            reason => Sfdutf7Error::MalformedBase64Run { offset, reason },
        }
    }
}
