//! Shared helpers for line scanning.

/// Returns the leading run of `items` for which `predicate` holds.
///
/// Stops at the first element that fails the predicate; later matching
/// elements are not included.
pub fn take_while_true<'a, T, F>(items: &'a [T], mut predicate: F) -> &'a [T]
where
    F: FnMut(&T) -> bool,
{
    let end = items
        .iter()
        .position(|item| !predicate(item))
        .unwrap_or(items.len());
    &items[..end]
}

/// Returns the text after a leading `-` bullet, or `None` when the line is
/// not a dash item.
pub fn dash_item(line: &str) -> Option<&str> {
    line.strip_prefix('-').map(str::trim)
}
