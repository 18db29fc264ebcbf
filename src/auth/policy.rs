use crate::models::Actor;

/// The single mutation predicate. Every edit/delete path on reviews and
/// comments goes through here before touching storage. Ownership is compared
/// by immutable numeric id; display names are presentation only.
pub fn can_mutate(actor: &Actor, owner_id: i64) -> bool {
    actor.is_admin || actor.id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: i64, is_admin: bool) -> Actor {
        Actor {
            id,
            username: format!("user{}", id),
            is_admin,
        }
    }

    #[test]
    fn test_author_may_mutate() {
        assert!(can_mutate(&actor(7, false), 7));
    }

    #[test]
    fn test_other_user_may_not_mutate() {
        assert!(!can_mutate(&actor(8, false), 7));
    }

    #[test]
    fn test_admin_override() {
        assert!(can_mutate(&actor(99, true), 7));
    }
}
