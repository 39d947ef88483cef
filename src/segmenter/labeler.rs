use super::{HeadingPattern, SegmentError};

/// One raw input line, tagged with the book it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub book: String,
    pub text: String,
}

impl RawLine {
    pub fn new(book: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            text: text.into(),
        }
    }
}

/// A raw line with its computed chapter index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledLine {
    pub book: String,
    pub chapter: u32,
    pub text: String,
}

/// Assign chapter indices to an ordered, book-contiguous line sequence.
///
/// The counter starts at 0 for each book and resets whenever the book value
/// changes from the previous line. A heading match increments the counter
/// *before* the line is labeled, so the heading line itself carries the new
/// index and everything before the first heading stays in chapter 0.
///
/// The output has the same length and order as the input. Fails if any line
/// carries a blank book title.
pub fn label_lines(
    lines: Vec<RawLine>,
    pattern: &HeadingPattern,
) -> Result<Vec<LabeledLine>, SegmentError> {
    let mut labeled = Vec::with_capacity(lines.len());
    let mut current_book: Option<String> = None;
    let mut chapter: u32 = 0;

    for line in lines {
        if line.book.trim().is_empty() {
            return Err(SegmentError::MissingBook {
                position: labeled.len(),
            });
        }

        if current_book.as_deref() != Some(line.book.as_str()) {
            current_book = Some(line.book.clone());
            chapter = 0;
        }

        if pattern.matches(&line.text) {
            chapter += 1;
        }

        labeled.push(LabeledLine {
            book: line.book,
            chapter,
            text: line.text,
        });
    }

    Ok(labeled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(lines: Vec<RawLine>) -> Vec<LabeledLine> {
        label_lines(lines, &HeadingPattern::default()).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let labeled = label(vec![]);
        assert!(labeled.is_empty());
    }

    #[test]
    fn test_front_matter_is_chapter_zero() {
        let labeled = label(vec![
            RawLine::new("Emma", "EMMA"),
            RawLine::new("Emma", "by Jane Austen"),
        ]);

        assert_eq!(labeled.len(), 2);
        assert!(labeled.iter().all(|l| l.chapter == 0));
    }

    #[test]
    fn test_heading_line_carries_new_index() {
        let labeled = label(vec![
            RawLine::new("Emma", "front matter"),
            RawLine::new("Emma", "CHAPTER I"),
            RawLine::new("Emma", "body"),
        ]);

        let indices: Vec<u32> = labeled.iter().map(|l| l.chapter).collect();
        assert_eq!(indices, vec![0, 1, 1]);
    }

    #[test]
    fn test_indices_increase_by_one_per_heading() {
        let lines = vec![
            RawLine::new("Emma", "CHAPTER I"),
            RawLine::new("Emma", "one"),
            RawLine::new("Emma", "CHAPTER II"),
            RawLine::new("Emma", "CHAPTER III"),
            RawLine::new("Emma", "three"),
        ];
        let labeled = label(lines);

        let indices: Vec<u32> = labeled.iter().map(|l| l.chapter).collect();
        assert_eq!(indices, vec![1, 1, 2, 3, 3]);
    }

    #[test]
    fn test_book_change_resets_counter() {
        let labeled = label(vec![
            RawLine::new("Emma", "CHAPTER I"),
            RawLine::new("Emma", "text"),
            RawLine::new("Persuasion", "intro"),
            RawLine::new("Persuasion", "Chapter 1"),
        ]);

        assert_eq!(labeled[0].chapter, 1);
        assert_eq!(labeled[1].chapter, 1);
        assert_eq!(labeled[2].chapter, 0);
        assert_eq!(labeled[3].chapter, 1);
    }

    #[test]
    fn test_output_preserves_length_and_order() {
        let lines: Vec<RawLine> = (0..50)
            .map(|i| RawLine::new("Emma", format!("line {}", i)))
            .collect();
        let labeled = label(lines.clone());

        assert_eq!(labeled.len(), lines.len());
        for (raw, out) in lines.iter().zip(&labeled) {
            assert_eq!(raw.text, out.text);
        }
    }

    #[test]
    fn test_empty_line_text_is_valid() {
        let labeled = label(vec![RawLine::new("Emma", "")]);
        assert_eq!(labeled[0].chapter, 0);
        assert_eq!(labeled[0].text, "");
    }

    #[test]
    fn test_blank_book_rejected() {
        let err = label_lines(
            vec![
                RawLine::new("Emma", "ok"),
                RawLine::new("  ", "orphan line"),
            ],
            &HeadingPattern::default(),
        )
        .unwrap_err();

        match err {
            SegmentError::MissingBook { position } => assert_eq!(position, 1),
            other => panic!("unexpected error: {}", other),
        }
    }
}
