//! Ingredients and steps are stored as comma-joined strings.

/// Why a list could not be stored.
#[derive(Debug, PartialEq, Eq)]
pub enum ListError {
    Empty,
    BlankItem,
    ContainsComma,
}

/// Trim every item and join with `", "`.
///
/// Items must be non-blank and comma-free so that [`split`] restores them.
pub fn join(items: &[String]) -> Result<String, ListError> {
    if items.is_empty() {
        return Err(ListError::Empty);
    }
    let mut trimmed = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if item.is_empty() {
            return Err(ListError::BlankItem);
        }
        if item.contains(',') {
            return Err(ListError::ContainsComma);
        }
        trimmed.push(item);
    }
    Ok(trimmed.join(", "))
}

pub fn split(stored: &str) -> Vec<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
