//! Text model primitives: byte sizes/ranges and 1-based line/column lookup.

pub use text_size::{TextRange, TextSize};

/// A 1-based line/column pair, as reported in diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// Pre-computed line start offsets for a particular source file snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    line_ends: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = Vec::with_capacity(128);
        let mut line_ends = Vec::with_capacity(128);
        line_starts.push(TextSize::from(0));

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + 1) as u32));
                    i += 1;
                }
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        line_ends.push(TextSize::from(i as u32));
                        line_starts.push(TextSize::from((i + 2) as u32));
                        i += 2;
                    } else {
                        line_ends.push(TextSize::from(i as u32));
                        line_starts.push(TextSize::from((i + 1) as u32));
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }

        line_ends.push(TextSize::from(text.len() as u32));

        Self {
            line_starts,
            line_ends,
            text_len: TextSize::from(text.len() as u32),
        }
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.text_len
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    #[inline]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line as usize).copied()
    }

    #[inline]
    pub fn line_end(&self, line: u32) -> Option<TextSize> {
        self.line_ends.get(line as usize).copied()
    }

    fn line_index(&self, offset: TextSize) -> usize {
        // Clamp offsets that point past the end; callers may pass `text_len`
        // when referring to EOF.
        let offset = offset.min(self.text_len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        }
    }

    /// Convert a byte offset to a 1-based line/column pair.
    ///
    /// Column is counted in UTF-8 bytes from the start of the line, then
    /// converted to a 1-based count of Unicode scalar values so that
    /// multi-byte identifiers still report a sensible column.
    pub fn line_col(&self, text: &str, offset: TextSize) -> LineCol {
        let offset = offset.min(self.text_len);
        let line = self.line_index(offset);
        let line_start = self.line_starts[line];
        let line_end = self.line_ends[line];
        let clamped = offset.min(line_end);

        let start = u32::from(line_start) as usize;
        let end = u32::from(clamped) as usize;
        let column = text[start..end].chars().count() as u32 + 1;

        LineCol {
            line: line as u32 + 1,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_first_column_is_one_one() {
        let text = "class A {}\n";
        let index = LineIndex::new(text);
        let lc = index.line_col(text, TextSize::from(0));
        assert_eq!(lc, LineCol { line: 1, column: 1 });
    }

    #[test]
    fn column_counts_chars_not_bytes() {
        let text = "// \u{4e2d}\u{6587}\nclass A {}";
        let index = LineIndex::new(text);
        // offset right after the two 3-byte CJK chars and the "// " prefix.
        let offset = TextSize::from("// \u{4e2d}\u{6587}".len() as u32);
        let lc = index.line_col(text, offset);
        assert_eq!(lc.line, 1);
        assert_eq!(lc.column, 6); // "// " (3) + 2 chars + 1
    }

    #[test]
    fn second_line_starts_at_line_two() {
        let text = "a\nb";
        let index = LineIndex::new(text);
        let lc = index.line_col(text, TextSize::from(2));
        assert_eq!(lc, LineCol { line: 2, column: 1 });
    }

    #[test]
    fn crlf_is_treated_as_a_single_line_break() {
        let text = "a\r\nb";
        let index = LineIndex::new(text);
        let lc = index.line_col(text, TextSize::from(3));
        assert_eq!(lc, LineCol { line: 2, column: 1 });
    }
}
