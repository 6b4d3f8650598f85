//! Text/binary decision from a short file prefix.
use crate::types::FileKind;

/// Number of leading bytes inspected.
pub const PREFIX_LEN: usize = 50;

/// Classify a file prefix. Any control byte other than tab, LF and CR, or a
/// DEL byte, makes the file binary. Prefixes shorter than `PREFIX_LEN` are
/// judged on what is there.
pub fn classify_prefix(prefix: &[u8]) -> FileKind {
    let head = &prefix[..prefix.len().min(PREFIX_LEN)];
    if head.iter().copied().any(is_control_byte) {
        FileKind::Binary
    } else {
        FileKind::Text
    }
}

fn is_control_byte(b: u8) -> bool {
    b == 0x7F || (b <= 0x1F && !matches!(b, b'\t' | b'\n' | b'\r'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_with_whitespace_controls_is_text() {
        assert_eq!(classify_prefix(b"fn main() {\r\n\tlet x = 1;\n}"), FileKind::Text);
    }

    #[test]
    fn nul_or_del_means_binary() {
        assert_eq!(classify_prefix(b"PK\x03\x04"), FileKind::Binary);
        assert_eq!(classify_prefix(b"abc\x7f"), FileKind::Binary);
        assert_eq!(classify_prefix(b"\0"), FileKind::Binary);
    }

    #[test]
    fn only_the_prefix_is_inspected() {
        let mut bytes = vec![b'a'; PREFIX_LEN];
        bytes.push(0);
        assert_eq!(classify_prefix(&bytes), FileKind::Text);
    }

    #[test]
    fn empty_and_short_files_are_text() {
        assert_eq!(classify_prefix(b""), FileKind::Text);
        assert_eq!(classify_prefix(b"hi"), FileKind::Text);
    }

    #[test]
    fn utf8_multibyte_is_not_control() {
        assert_eq!(classify_prefix("héllo wörld".as_bytes()), FileKind::Text);
    }
}
