//! The authorship check gating edit and delete actions.
//!
//! Only the author of a record (or a staff account) may mutate it. A denied
//! attempt is not a hard error: the caller is sent back to the parent post's
//! detail view, consistent with how list and detail handlers treat readers.

use uuid::Uuid;

/// Records that carry an owning author, fixed at creation.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

/// The requesting identity, as established by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_staff: bool,
}

impl Actor {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            is_staff: false,
        }
    }
}

/// True iff `actor` may edit or delete `record`.
pub fn can_modify<T: Authored>(actor: &Actor, record: &T) -> bool {
    actor.is_staff || actor.id == record.author_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Comment;

    fn comment_by(author_id: Uuid) -> Comment {
        Comment::new(Uuid::new_v4(), author_id, "hi".into())
    }

    #[test]
    fn author_may_modify_own_record() {
        let author = Actor::new(Uuid::new_v4());
        assert!(can_modify(&author, &comment_by(author.id)));
    }

    #[test]
    fn non_author_may_not_modify() {
        let stranger = Actor::new(Uuid::new_v4());
        assert!(!can_modify(&stranger, &comment_by(Uuid::new_v4())));
    }

    #[test]
    fn staff_may_modify_anything() {
        let staff = Actor {
            id: Uuid::new_v4(),
            is_staff: true,
        };
        assert!(can_modify(&staff, &comment_by(Uuid::new_v4())));
    }
}
