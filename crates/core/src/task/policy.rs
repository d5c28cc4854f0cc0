//! Ownership access policy
//!
//! Decides whether an identity may act on a given task. Kept free of storage
//! concerns so it can be tested without a store. There is no role hierarchy,
//! sharing, or admin override: the owner is the only authorized identity.

use crate::error::Error;
use crate::identity::Identity;
use crate::Result;

use super::model::Task;

/// True iff the identity owns the task
pub fn can_access(identity: &Identity, task: &Task) -> bool {
    task.owner_id == identity.id
}

/// Gate a single-record operation; `Forbidden` when the identity is not the owner
pub fn authorize(identity: &Identity, task: &Task) -> Result<()> {
    if can_access(identity, task) {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_owner_can_access() {
        let owner = Identity::new(Uuid::new_v4());
        let task = Task::new(owner.id, "Mine").unwrap();
        assert!(can_access(&owner, &task));
        assert!(authorize(&owner, &task).is_ok());
    }

    #[test]
    fn test_other_identity_cannot_access() {
        let owner = Identity::new(Uuid::new_v4());
        let stranger = Identity::new(Uuid::new_v4());
        let task = Task::new(owner.id, "Mine").unwrap();
        assert!(!can_access(&stranger, &task));
        match authorize(&stranger, &task).unwrap_err() {
            Error::Forbidden => {}
            e => panic!("Expected Forbidden error, got: {:?}", e),
        }
    }
}
