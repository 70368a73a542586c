use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::role::Role;
use crate::console::ConsoleError;

/// Session context passed into every console at construction
#[derive(Debug, Clone)]
pub struct ConsoleSession {
    origin: String,
    role: Role,
    started_at: DateTime<Utc>,
}

impl ConsoleSession {
    /// Starts a session with a fresh origin id
    pub fn new(role: Role) -> Self {
        Self::with_origin(Uuid::new_v4().to_string(), role)
    }

    pub fn with_origin(origin: impl Into<String>, role: Role) -> Self {
        Self {
            origin: origin.into(),
            role,
            started_at: Utc::now(),
        }
    }

    /// Identifies writes made by this console in change notifications
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ensure_can_tag(&self) -> Result<(), ConsoleError> {
        if self.role.can_tag() {
            Ok(())
        } else {
            Err(ConsoleError::NotPermitted(self.role))
        }
    }
}
