//! The base64-over-UTF-16BE codec used inside shifted runs.
//!
//! Guess what, FontForge's runs aren't quite UTF-7 runs either. The payload is
//! ordinary base64 (standard alphabet, `=` padding) of the UTF-16BE code units,
//! but the writer pads each run with the sentinel letter `A` so that it ends on
//! an even byte, and readers must cope with runs ending in `A`, `AA` or `-`.
//!
//! Everything here works on an isolated run: the shift markers around it have
//! already been dealt with by the scanners behind [`crate::encode()`] and
//! [`crate::decode()`].

use std::borrow::Cow;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::error::RunError;

pub(crate) const SHIFT_IN: u8 = b'+';
pub(crate) const SHIFT_OUT: u8 = b'-';
pub(crate) const SENTINEL: u8 = b'A';
pub(crate) const QUOTE: u8 = b'"';
const PAD: u8 = b'=';

// Encodes with padding, decodes with or without it. Non-zero trailing bits
// are rejected.
const RUN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// a-z, A-Z, 0-9 and '/'. '+' is left out because it is the shift-in marker.
const BASE64_SYMBOLS: [bool; 256] = {
    let mut table = [false; 256];
    let mut byte = 0;
    while byte < 256 {
        table[byte] = matches!(byte as u8, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'/');
        byte += 1;
    }
    table
};

/// Whether `byte` belongs to the modified base64 alphabet.
#[inline]
pub fn is_base64(byte: u8) -> bool {
    BASE64_SYMBOLS[byte as usize]
}

/// Base64-encodes `run` as UTF-16BE. Astral characters become surrogate pairs.
pub fn encode_run(run: &str) -> String {
    let octets: Vec<u8> = run.encode_utf16().flat_map(u16::to_be_bytes).collect();
    RUN_ENGINE.encode(octets)
}

/// Turns the base64 text of a run into the bytes written to the file.
///
/// The result starts with the shift-in marker. Padding never survives: a
/// doubled `=` is cut to one, and a remaining `=` becomes the sentinel `A`
/// followed by an explicit shift-out. An unpadded run that happens to end in
/// `AA` gets a sentinel pair of its own, so that [`strip_sentinel`] removes
/// the pair rather than payload.
pub fn shift_run(b64: &[u8]) -> Vec<u8> {
    let mut shifted = Vec::with_capacity(b64.len() + 3);
    shifted.push(SHIFT_IN);
    shifted.extend_from_slice(b64);
    if shifted.len() >= 2 && shifted[shifted.len() - 2] == PAD {
        shifted.pop();
    }
    if shifted.last() == Some(&PAD) {
        shifted.pop();
        shifted.extend_from_slice(&[SENTINEL, SHIFT_OUT]);
    } else if shifted.len() > 2 && shifted.ends_with(&[SENTINEL, SENTINEL]) {
        shifted.extend_from_slice(&[SENTINEL, SENTINEL]);
    }
    shifted
}

/// Removes the writer's even-length padding from the end of a run.
///
/// An even-length run ending in `AA` loses both letters; otherwise a single
/// trailing `A` is dropped.
pub fn strip_sentinel(run: &[u8]) -> &[u8] {
    if run.len() >= 2 && run.len() % 2 == 0 && run.ends_with(&[SENTINEL, SENTINEL]) {
        &run[..run.len() - 2]
    } else if let Some(stripped) = run.strip_suffix(&[SENTINEL]) {
        stripped
    } else {
        run
    }
}

/// Makes sure the run ends with the shift-out marker.
pub fn with_shift_out(run: &[u8]) -> Cow<'_, [u8]> {
    if run.last() == Some(&SHIFT_OUT) {
        Cow::Borrowed(run)
    } else {
        let mut terminated = Vec::with_capacity(run.len() + 1);
        terminated.extend_from_slice(run);
        terminated.push(SHIFT_OUT);
        Cow::Owned(terminated)
    }
}

/// Decodes the payload of one shifted run (the bytes after `+`).
///
/// The payload may end in sentinel padding, `=` padding or an explicit `-`.
pub fn decode_run(run: &[u8]) -> Result<String, RunError> {
    let octets = payload_octets(run)?;
    utf16be_to_string(&octets)
}

/// The UTF-16BE octets carried by a run, sentinel padding removed.
pub(crate) fn payload_octets(run: &[u8]) -> Result<Vec<u8>, RunError> {
    let run = run.strip_suffix(&[SHIFT_OUT]).unwrap_or(run);
    // The sentinel rule can eat real payload when the last base64 digit is
    // itself an `A`, so fall back to the other readings before giving up.
    let candidates = [
        Some(strip_sentinel(run)),
        run.strip_suffix(&[SENTINEL]),
        run.strip_suffix(&[SENTINEL, SENTINEL]),
        Some(run),
    ];
    let mut first_error = None;
    for (attempt, candidate) in candidates.into_iter().flatten().enumerate() {
        match candidate_octets(candidate) {
            Ok(octets) => {
                if attempt > 0 {
                    log::debug!(
                        "Run {:?} decoded only after reading its padding differently",
                        String::from_utf8_lossy(run)
                    );
                }
                return Ok(octets);
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or(RunError::Empty))
}

fn candidate_octets(candidate: &[u8]) -> Result<Vec<u8>, RunError> {
    if candidate.is_empty() {
        return Err(RunError::Empty);
    }
    let octets = RUN_ENGINE.decode(candidate)?;
    if octets.len() % 2 != 0 {
        return Err(RunError::OddOctets(octets.len()));
    }
    Ok(octets)
}

fn utf16be_to_string(octets: &[u8]) -> Result<String, RunError> {
    let units = octets
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|unit| unit.map_err(|e| RunError::UnpairedSurrogate(e.unpaired_surrogate())))
        .collect()
}
