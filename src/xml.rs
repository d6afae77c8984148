//! Cleaning decoded strings so they can be written into XML.
//!
//! SFD strings may hold control characters that XML 1.0 forbids. Nothing in
//! the transcoder calls this; run it on decoded text before handing the text
//! to an XML writer.

use std::borrow::Cow;

/// XML 1.0 `Char`: tab, LF, CR and everything from U+0020 up, minus the
/// noncharacters U+FFFE and U+FFFF.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | ' '..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Replaces characters XML cannot carry.
///
/// A vertical tab becomes a newline; everything else becomes U+FFFD. Text that
/// is already clean is returned as-is.
pub fn force_xml_text(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.chars()
            .map(|c| match c {
                c if is_xml_char(c) => c,
                '\u{0B}' => {
                    log::warn!("Replaced vertical tab with newline; suspected FontForge bug?");
                    '\n'
                }
                c => {
                    log::warn!("Replaced U+{:04X} with U+FFFD in string {:?}", c as u32, s);
                    '\u{FFFD}'
                }
            })
            .collect(),
    )
}
