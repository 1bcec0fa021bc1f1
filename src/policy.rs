//! Note access-control policy.
//!
//! Ownership, the privacy flag, and the shared-with set decide who may
//! read, modify, or list a note:
//!
//! - owners read, update, share, and delete their own notes;
//! - anyone (authenticated or not) reads notes with isPrivate = false;
//! - callers listed in sharedWith read the note;
//! - the shared-with set never contains the owner and never contains
//!   duplicates, regardless of what the caller supplied.

use crate::models::Note;

/// Compute the canonical shared-with set for a note.
///
/// Takes the caller-supplied target ids, trims them, drops empties,
/// removes duplicates (keeping first occurrence order), and strips the
/// owner's own id if present. The result fully REPLACES the previous
/// set; sharing is never a merge.
pub fn normalize_shared_with(owner_id: &str, targets: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    targets
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && *id != owner_id)
        .filter(|id| seen.insert(id.to_string()))
        .map(|id| id.to_string())
        .collect()
}

/// Whether the caller is the note's owner. Owner identity is the sole
/// authority for update, privacy, share, and delete.
pub fn is_owner(note: &Note, caller_id: &str) -> bool {
    note.user == caller_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn note(owner: &str, is_private: bool, shared_with: &[&str]) -> Note {
        Note {
            id: "n1".to_string(),
            title: "T".to_string(),
            text: "X".to_string(),
            user: owner.to_string(),
            is_private,
            shared_with: shared_with.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_strips_owner() {
        let result = normalize_shared_with("a", &["b".to_string(), "a".to_string()]);
        assert_eq!(result, vec!["b"]);
    }

    #[test]
    fn test_normalize_dedupes_preserving_order() {
        let input: Vec<String> = ["c", "b", "c", "b", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = normalize_shared_with("a", &input);
        assert_eq!(result, vec!["c", "b", "d"]);
    }

    #[test]
    fn test_normalize_drops_empty_and_whitespace() {
        let input: Vec<String> = ["", "  ", " b ", "b"].iter().map(|s| s.to_string()).collect();
        let result = normalize_shared_with("a", &input);
        assert_eq!(result, vec!["b"]);
    }

    #[test]
    fn test_normalize_owner_and_duplicates_combined() {
        // The worked example: A shares with [B, A, B] -> [B]
        let input: Vec<String> = ["B", "A", "B"].iter().map(|s| s.to_string()).collect();
        let result = normalize_shared_with("A", &input);
        assert_eq!(result, vec!["B"]);
    }

    #[test]
    fn test_owner_check() {
        let n = note("a", true, &[]);
        assert!(is_owner(&n, "a"));
        assert!(!is_owner(&n, "b"));
    }

}
