//! Input normalization utilities.

use super::IndexedLine;

/// Trims every line and drops blank ones, remembering original positions.
///
/// Carriage returns are folded into line breaks first so pasted Windows and
/// classic Mac text split the same way as Unix text.
pub fn normalize_lines(raw: &str) -> Vec<IndexedLine> {
    let replaced = raw.replace("\r\n", "\n").replace('\r', "\n");

    replaced
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(IndexedLine {
                    index,
                    text: trimmed.to_string(),
                })
            }
        })
        .collect()
}
