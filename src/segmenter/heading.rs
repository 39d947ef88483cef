use regex::Regex;

use super::{SegmentError, DEFAULT_HEADING_PATTERN};

/// Compiled chapter-heading rule
///
/// Wraps a regex tested against each raw line; a match marks the line as the
/// start of a new chapter. Corpora with different heading conventions supply
/// their own pattern instead of the default.
#[derive(Debug, Clone)]
pub struct HeadingPattern {
    regex: Regex,
}

impl HeadingPattern {
    /// Compile a custom heading pattern
    pub fn new(pattern: &str) -> Result<Self, SegmentError> {
        let regex = Regex::new(pattern).map_err(|e| SegmentError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// Test whether a line is a chapter heading
    pub fn matches(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// The source pattern, for manifests and diagnostics
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for HeadingPattern {
    fn default() -> Self {
        Self::new(DEFAULT_HEADING_PATTERN).expect("default heading pattern compiles")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_matches_numerals() {
        let pattern = HeadingPattern::default();

        assert!(pattern.matches("Chapter 9"));
        assert!(pattern.matches("chapter ix"));
        assert!(pattern.matches("CHAPTER XLVII"));
        assert!(pattern.matches("Chapter 12. The Picnic"));
    }

    #[test]
    fn test_default_pattern_requires_whitespace() {
        let pattern = HeadingPattern::default();

        assert!(!pattern.matches("chapterhouse"));
        assert!(!pattern.matches("chapter"));
    }

    #[test]
    fn test_default_pattern_character_class_boundary() {
        let pattern = HeadingPattern::default();

        // The first character after the whitespace must be numeral-like.
        assert!(!pattern.matches("Chapter nine"));
        assert!(!pattern.matches("Chapter abc"));
        // 'c' is in the class, so a heading starting with it still matches.
        assert!(pattern.matches("Chapter cv"));
    }

    #[test]
    fn test_default_pattern_anchored_at_line_start() {
        let pattern = HeadingPattern::default();

        assert!(!pattern.matches("See Chapter 4 for details"));
        assert!(!pattern.matches(" Chapter 4"));
    }

    #[test]
    fn test_custom_pattern() {
        let pattern = HeadingPattern::new(r"^BOOK [IVX]+$").unwrap();

        assert!(pattern.matches("BOOK IV"));
        assert!(!pattern.matches("Chapter 1"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = HeadingPattern::new("(unclosed").unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }
}
