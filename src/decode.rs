use crate::{
    error::Sfdutf7Error,
    utf7::{self, QUOTE, SHIFT_IN, SHIFT_OUT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Bytes are literal characters
    Literal,
    /// Inside a base64 run whose payload begins at byte `start`
    Shifted { start: usize },
}

/// Drops the surrounding double quotes of an SFD string value, if both are there.
fn unquote(data: &[u8]) -> &[u8] {
    match data {
        [QUOTE, inner @ .., QUOTE] => inner,
        _ => data,
    }
}

fn flush(data: &[u8], start: usize, end: usize, out: &mut String) -> Result<(), Sfdutf7Error> {
    let run = &data[start..end];
    if run.is_empty() {
        // `+-`, or a `+` that no base64 followed
        out.push('+');
        return Ok(());
    }
    log::trace!("Unshifting {:?}", String::from_utf8_lossy(run));
    let decoded = utf7::decode_run(run).map_err(|e| Sfdutf7Error::in_run(start, e))?;
    out.push_str(&decoded);
    Ok(())
}

/// Decodes FontForge UTF-7.
///
/// With `quote`, a leading and trailing `"` are removed first. Literal bytes
/// outside ASCII are taken as Latin-1.
pub fn decode(data: &[u8], quote: bool) -> Result<String, Sfdutf7Error> {
    let data = if quote { unquote(data) } else { data };
    let mut out = String::with_capacity(data.len());
    let mut state = State::Literal;
    for (pos, &byte) in data.iter().enumerate() {
        state = match state {
            State::Literal if byte == SHIFT_IN => State::Shifted { start: pos + 1 },
            State::Literal => {
                out.push(char::from(byte));
                State::Literal
            }
            // A `+` inside a run is the base64 digit 62, not a new shift.
            State::Shifted { .. } if byte == SHIFT_IN || utf7::is_base64(byte) => state,
            State::Shifted { start } => {
                flush(data, start, pos, &mut out)?;
                if byte != SHIFT_OUT {
                    out.push(char::from(byte));
                }
                State::Literal
            }
        };
    }
    if let State::Shifted { start } = state {
        flush(data, start, data.len(), &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::error::RunError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(b"", "")]
    #[case(b"A", "A")]
    #[case(b"+-", "+")]
    #[case(b"+", "+")]
    #[case(b"a+", "a+")]
    #[case(b"+ ", "+ ")]
    #[case(b"+ACI-", "\"")]
    #[case(b"+ACIA-", "\"")]
    #[case(b"+ACIAA-", "\"")]
    #[case(b"+ACIA- ", "\" ")]
    #[case(b"+ACIA-A", "\"A")]
    #[case(b"+ZeVnLAA-go+ip4A-", "日本go語")]
    #[case(b"+ZeVnLAA", "日本")]
    #[case(b"+ZeVnLIqe.", "日本語.")]
    #[case(b"++//7/wA-", "\u{FBFF}\u{FBFF}")]
    #[case(b"caf\xe9", "café")]
    #[case(b"+ACIA\xe9", "\"é")]
    fn test_decode(#[case] data: &[u8], #[case] expected: &str) {
        assert_eq!(decode(data, false).unwrap(), expected);
    }

    #[test]
    fn test_padding_is_a_terminator() {
        // `=` is outside the alphabet, so it ends the run and stays literal.
        assert_eq!(decode(b"+ACI=-", false).unwrap(), "\"=-");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(decode(b"\"+ACIA-\"", true).unwrap(), "\"");
        assert_eq!(decode(b"\"Regular\"", true).unwrap(), "Regular");
        assert_eq!(decode(b"\"\"", true).unwrap(), "");
        assert_eq!(decode(b"\"", true).unwrap(), "\"");
        assert_eq!(decode(b"\"open", true).unwrap(), "\"open");
        assert_eq!(decode(b"\"Regular\"", false).unwrap(), "\"Regular\"");
    }

    #[test]
    fn test_bare_quote_ends_run_and_stays_literal() {
        // The encoder never writes a literal `"`, but the decoder accepts one.
        assert_eq!(decode(b"+ACIA\"", false).unwrap(), "\"\"");
        assert_eq!(decode(b"\"+ACIA-\"", false).unwrap(), "\"\"\"");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            decode(b"ab+A-", false),
            Err(Sfdutf7Error::MalformedBase64Run {
                offset: 3,
                reason: RunError::Empty
            })
        );
        assert_eq!(
            decode(b"+AQ-", false),
            Err(Sfdutf7Error::MalformedBase64Run {
                offset: 1,
                reason: RunError::OddOctets(1)
            })
        );
        assert!(matches!(
            decode(b"+ABC-", false),
            Err(Sfdutf7Error::MalformedBase64Run {
                offset: 1,
                reason: RunError::Base64(_)
            })
        ));
        assert_eq!(
            decode(b"x+2AA-", false),
            Err(Sfdutf7Error::InvalidSurrogatePair {
                offset: 2,
                unit: 0xD800
            })
        );
    }

    #[test]
    fn test_error_offsets_follow_unquoting() {
        assert_eq!(
            decode(b"\"+A-\"", true),
            Err(Sfdutf7Error::MalformedBase64Run {
                offset: 1,
                reason: RunError::Empty
            })
        );
    }
}
