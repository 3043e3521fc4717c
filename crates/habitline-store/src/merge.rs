/// Notes to keep when an event is written over an existing one.
///
/// Incoming notes win only when present and non-empty; otherwise the stored
/// notes are kept.
pub fn merge_notes(existing: Option<&str>, incoming: Option<&str>) -> Option<String> {
    match incoming {
        Some(notes) if !notes.is_empty() => Some(notes.to_string()),
        _ => existing.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::merge_notes;

    #[test]
    fn incoming_notes_replace_existing() {
        assert_eq!(
            merge_notes(Some("old"), Some("new")).as_deref(),
            Some("new")
        );
        assert_eq!(merge_notes(None, Some("new")).as_deref(), Some("new"));
    }

    #[test]
    fn empty_or_absent_incoming_keeps_existing() {
        assert_eq!(merge_notes(Some("old"), Some("")).as_deref(), Some("old"));
        assert_eq!(merge_notes(Some("old"), None).as_deref(), Some("old"));
        assert_eq!(merge_notes(None, Some("")), None);
        assert_eq!(merge_notes(None, None), None);
    }
}
