use super::CorpusError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode raw bytes into normalized text lines.
///
/// Strips a UTF-8 BOM if present, rejects non-UTF-8 input, and drops the
/// `\r` of CRLF line endings. Blank lines are kept: the assembler's join
/// semantics depend on them.
pub fn decode_lines(title: &str, bytes: &[u8]) -> Result<Vec<String>, CorpusError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text =
        std::str::from_utf8(bytes).map_err(|_| CorpusError::NotText(title.to_string()))?;

    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let lines = decode_lines("book", b"one\ntwo\nthree").unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_bom_stripped() {
        let lines = decode_lines("book", b"\xEF\xBB\xBFEMMA\nby Jane Austen").unwrap();
        assert_eq!(lines[0], "EMMA");
    }

    #[test]
    fn test_crlf_normalized() {
        let lines = decode_lines("book", b"one\r\ntwo\r\n").unwrap();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_blank_lines_kept() {
        let lines = decode_lines("book", b"\nEMMA\n\nCHAPTER I\n").unwrap();
        assert_eq!(lines, vec!["", "EMMA", "", "CHAPTER I"]);
    }

    #[test]
    fn test_empty_input() {
        let lines = decode_lines("book", b"").unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_binary_rejected() {
        let err = decode_lines("blob", &[0x00, 0xFF, 0xFE, 0x80]).unwrap_err();
        assert!(matches!(err, CorpusError::NotText(_)));
    }
}
