use proc_macro2::LineColumn;

/// Maps `proc-macro2` line/column positions back to byte offsets.
///
/// Lines are 1-based and columns count characters, so the conversion has to
/// walk the characters of the target line.
pub(crate) struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    pub(crate) fn offset(&self, position: LineColumn) -> usize {
        let Some(&start) = position
            .line
            .checked_sub(1)
            .and_then(|line| self.line_starts.get(line))
        else {
            return self.text.len();
        };
        let line = &self.text[start..];
        let column = line
            .char_indices()
            .nth(position.column)
            .map_or(line.len(), |(i, _)| i);
        start + column
    }
}
