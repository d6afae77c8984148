#![deny(clippy::unwrap_used, clippy::expect_used)]
//! Reading and writing strings in FontForge's dialect of UTF-7.
//!
//! SFD font sources store names, copyright notices and the like as quoted
//! strings in a UTF-7 lookalike. It differs from RFC 2152 in a few ways:
//! `"` is always shifted, runs are padded with the letter `A` to an even
//! length, and readers must accept runs ending in either `A` or `-`.
//!
//! ```
//! let encoded = sfdutf7::encode("Œuvre \"noire\"", true);
//! assert_eq!(encoded, b"\"+AVIA-uvre +ACIA-noire+ACIA-\"");
//! assert_eq!(sfdutf7::decode(&encoded, true).unwrap(), "Œuvre \"noire\"");
//! ```

mod decode;
mod encode;
mod error;
pub mod utf7;
pub mod xml;

pub use crate::{
    decode::decode,
    encode::{encode, encode_scalars},
    error::{RunError, Sfdutf7Error},
};
