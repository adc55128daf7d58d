//! Column layout for generated test names.
//!
//! Every dimension gets a column as wide as the widest of its header and its
//! formatted values. Cells are left-justified with spaces and joined by a
//! separator, so header and rows line up as a table in test output. Widths are
//! measured in terminal columns, not bytes.

use unicode_width::UnicodeWidthStr;

use crate::matrix::OutcomeMatrix;

/// Display width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Left-justifies `text` with spaces to `width` columns. Wider text is kept whole.
pub fn pad_end(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    let mut out = String::with_capacity(text.len() + fill);
    out.push_str(text);
    out.extend(std::iter::repeat(' ').take(fill));
    out
}

/// `max(width(header), max over labels of width(label))`.
pub fn column_width<'a>(header: &str, labels: impl IntoIterator<Item = &'a str>) -> usize {
    labels
        .into_iter()
        .map(display_width)
        .fold(display_width(header), usize::max)
}

/// Fixed column widths plus the separator placed between cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    widths: Vec<usize>,
    separator: String,
}

impl TableLayout {
    pub fn new(widths: Vec<usize>, separator: impl Into<String>) -> Self {
        Self {
            widths,
            separator: separator.into(),
        }
    }

    /// Measures one column per dimension of `matrix`.
    pub fn for_matrix<O, C>(matrix: &OutcomeMatrix<O, C>, separator: impl Into<String>) -> Self {
        let widths = matrix
            .entries()
            .iter()
            .map(|entry| {
                let labels: Vec<String> = entry.labels().collect();
                column_width(
                    entry.dimension.header(),
                    labels.iter().map(String::as_str),
                )
            })
            .collect();
        Self::new(widths, separator)
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Pads each cell to its column and joins them. Cells beyond the measured
    /// columns (an outcome column, say) are appended unpadded.
    pub fn render_row<S: AsRef<str>>(&self, cells: &[S]) -> String {
        cells
            .iter()
            .enumerate()
            .map(|(index, cell)| match self.widths.get(index) {
                Some(&width) => pad_end(cell.as_ref(), width),
                None => cell.as_ref().to_string(),
            })
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}
