//! Post authorization policy.

use super::CallerIdentity;

/// Decides whether `caller` may modify a post written by `author_id`.
///
/// Admins may edit any post. Everyone else may only edit their own.
#[must_use]
pub const fn can_edit(caller: &CallerIdentity, author_id: i32) -> bool {
    if caller.role.is_admin() {
        return true;
    }
    caller.id == author_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn caller(id: i32, role: Role) -> CallerIdentity {
        CallerIdentity {
            id,
            username: format!("user{id}"),
            role,
        }
    }

    #[test]
    fn admin_can_edit_any_post() {
        let admin = caller(3, Role::Admin);
        for author_id in [1, 2, 3, 42, -1] {
            assert!(can_edit(&admin, author_id));
        }
    }

    #[test]
    fn user_can_edit_only_own_posts() {
        let user = caller(1, Role::User);
        assert!(can_edit(&user, 1));
        assert!(!can_edit(&user, 2));
        assert!(!can_edit(&user, 0));
    }
}
