use crate::{
    error::Sfdutf7Error,
    utf7::{self, QUOTE, SHIFT_IN, SHIFT_OUT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Copying printable ASCII straight through
    Literal,
    /// Collecting characters for a base64 run beginning at byte `start` of the text
    Shifted { start: usize },
}

/// Printable ASCII is written as-is, except `"`, which FontForge always shifts.
fn is_literal(ch: char) -> bool {
    matches!(ch, ' '..='~') && ch != '"'
}

/// Characters that would be read as part of an unterminated run, or that
/// would be swallowed as its terminator.
fn needs_shift_out(ch: char) -> bool {
    ch == '-' || ch == '+' || utf7::is_base64(ch as u8)
}

fn flush(run: &str) -> Vec<u8> {
    log::trace!("Shifting {:?}", run);
    utf7::shift_run(utf7::encode_run(run).as_bytes())
}

/// Encodes `text` in FontForge's UTF-7 variant.
///
/// With `quote`, the result is wrapped in double quotes, ready to be written
/// as an SFD string value.
pub fn encode(text: &str, quote: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    if quote {
        out.push(QUOTE);
    }
    let mut state = State::Literal;
    for (pos, ch) in text.char_indices() {
        state = match (state, is_literal(ch)) {
            (State::Literal, false) => State::Shifted { start: pos },
            (shifted @ State::Shifted { .. }, false) => shifted,
            (State::Shifted { start }, true) => {
                let shifted = flush(&text[start..pos]);
                if needs_shift_out(ch) {
                    out.extend_from_slice(&utf7::with_shift_out(&shifted));
                } else {
                    out.extend_from_slice(&shifted);
                }
                push_literal(&mut out, ch);
                State::Literal
            }
            (State::Literal, true) => {
                push_literal(&mut out, ch);
                State::Literal
            }
        };
    }
    if let State::Shifted { start } = state {
        out.extend_from_slice(&flush(&text[start..]));
    }
    if quote {
        out.push(QUOTE);
    }
    out
}

fn push_literal(out: &mut Vec<u8>, ch: char) {
    if ch == '+' {
        out.extend_from_slice(&[SHIFT_IN, SHIFT_OUT]);
    } else {
        out.push(ch as u8);
    }
}

/// Encodes a sequence of raw code points.
///
/// Fails on surrogates and values past U+10FFFF, which UTF-16 cannot carry.
pub fn encode_scalars<I>(scalars: I, quote: bool) -> Result<Vec<u8>, Sfdutf7Error>
where
    I: IntoIterator<Item = u32>,
{
    let text = scalars
        .into_iter()
        .map(|scalar| {
            char::from_u32(scalar).ok_or(Sfdutf7Error::NonRepresentableScalar { scalar })
        })
        .collect::<Result<String, _>>()?;
    Ok(encode(&text, quote))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", b"")]
    #[case("A", b"A")]
    #[case("+", b"+-")]
    #[case("1+1", b"1+-1")]
    #[case("\"", b"+ACIA-")]
    #[case("\"\"", b"+ACIAIgA-")]
    #[case("\"\n", b"+ACIACgA-")]
    #[case("\" ", b"+ACIA- ")]
    #[case("\"A", b"+ACIA-A")]
    #[case("日本go語", b"+ZeVnLAA-go+ip4A-")]
    #[case("a😀b", b"a+2D3eAAA-b")]
    #[case("ø+", b"+APgA-+-")]
    fn test_encode(#[case] text: &str, #[case] expected: &[u8]) {
        assert_eq!(encode(text, false), expected.to_vec());
    }

    #[rstest]
    #[case("日本語a", b"+ZeVnLIqe-a")]
    #[case("日本語-", b"+ZeVnLIqe--")]
    #[case("日本語+", b"+ZeVnLIqe-+-")]
    #[case("日本語.", b"+ZeVnLIqe.")]
    #[case("日本語", b"+ZeVnLIqe")]
    fn test_unpadded_run_shift_out(#[case] text: &str, #[case] expected: &[u8]) {
        assert_eq!(encode(text, false), expected.to_vec());
    }

    #[test]
    fn test_unpadded_run_ending_in_sentinel() {
        assert_eq!(encode("ĀĀĀ", false), b"+AQABAAEA".to_vec());
        assert_eq!(encode("日本\u{3000}", false), b"+ZeVnLDAAAA".to_vec());
    }

    #[test]
    fn test_quote() {
        assert_eq!(encode("", true), b"\"\"".to_vec());
        assert_eq!(encode("Regular", true), b"\"Regular\"".to_vec());
        assert_eq!(encode("\"", true), b"\"+ACIA-\"".to_vec());
    }

    #[test]
    fn test_quote_is_never_literal() {
        let encoded = encode("say \"cheese\"", false);
        assert!(!encoded.contains(&QUOTE));
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(
            encode_scalars([0x65E5, 0x672C], false).unwrap(),
            b"+ZeVnLAA-".to_vec()
        );
        assert_eq!(
            encode_scalars([0x41, 0xD800], false),
            Err(Sfdutf7Error::NonRepresentableScalar { scalar: 0xD800 })
        );
        assert_eq!(
            encode_scalars([0x110000], true),
            Err(Sfdutf7Error::NonRepresentableScalar { scalar: 0x110000 })
        );
    }
}
