//! # Reference Maintainer
//!
//! The one place ownership lists (User.posts, Topic.posts, User.comments,
//! User.bookmarks) get mutated. Both halves of a bidirectional relation go
//! through here, each followed by a single-document save on the caller's
//! side. If the second save fails the relation is one-sided until retried;
//! retries converge because every mode is idempotent.

use uuid::Uuid;

/// How to mutate an ownership list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefMode {
    /// Append if absent. A duplicate add is a no-op, not an error.
    Add,
    /// Remove if present. Removing an already-gone id is a no-op.
    Remove,
    /// Present → remove; absent → add.
    Toggle,
}

/// Applies `mode` for `target` to an ownership list.
///
/// Returns whether the list changed, so callers can skip the save on
/// no-op mutations if they want (most don't bother; the save is atomic
/// and idempotent anyway).
pub fn set_reference(list: &mut Vec<Uuid>, mode: RefMode, target: Uuid) -> bool {
    let index = list.iter().position(|id| *id == target);

    match (mode, index) {
        (RefMode::Add, None) | (RefMode::Toggle, None) => {
            list.push(target);
            true
        }
        (RefMode::Remove, Some(i)) | (RefMode::Toggle, Some(i)) => {
            list.remove(i);
            true
        }
        (RefMode::Add, Some(_)) | (RefMode::Remove, None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let id = Uuid::now_v7();
        let mut list = vec![];

        assert!(set_reference(&mut list, RefMode::Add, id));
        assert!(!set_reference(&mut list, RefMode::Add, id));
        assert_eq!(list, vec![id]);
    }

    #[test]
    fn test_remove_of_absent_id_is_a_noop() {
        let keep = Uuid::now_v7();
        let mut list = vec![keep];

        assert!(!set_reference(&mut list, RefMode::Remove, Uuid::now_v7()));
        assert_eq!(list, vec![keep]);
    }

    #[test]
    fn test_remove_drops_the_single_occurrence() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let mut list = vec![a, b];

        assert!(set_reference(&mut list, RefMode::Remove, a));
        assert_eq!(list, vec![b]);
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let id = Uuid::now_v7();
        let mut list = vec![];

        set_reference(&mut list, RefMode::Toggle, id);
        assert_eq!(list, vec![id]);

        set_reference(&mut list, RefMode::Toggle, id);
        assert!(list.is_empty());
    }
}
