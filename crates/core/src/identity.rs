//! Authenticated identity
//!
//! Every core operation that touches a task takes the caller's identity as an
//! explicit argument. There is no ambient session state.

use uuid::Uuid;

/// The authenticated user on whose behalf an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
}

impl Identity {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

impl From<Uuid> for Identity {
    fn from(id: Uuid) -> Self {
        Self { id }
    }
}
