use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("display name must not be empty")]
    EmptyName,
}

/// What a user is allowed to see and do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    #[must_use]
    pub fn is_student(&self) -> bool {
        matches!(self, Role::Student)
    }

    #[must_use]
    pub fn is_teacher(&self) -> bool {
        matches!(self, Role::Teacher)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        };
        write!(f, "{label}")
    }
}

/// Identity record supplied to the core by the login selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    role: Role,
    name: String,
}

impl User {
    /// Create a user record.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if the username or display name is empty.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        name: impl Into<String>,
    ) -> Result<Self, UserError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserError::EmptyUsername);
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserError::EmptyName);
        }

        Ok(Self {
            id,
            username,
            email: email.into(),
            role,
            name,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_student() {
        let user = User::new(
            UserId::new(1),
            "john_student",
            "john@example.com",
            Role::Student,
            "John Smith",
        )
        .unwrap();

        assert_eq!(user.id(), UserId::new(1));
        assert!(user.role().is_student());
        assert_eq!(user.name(), "John Smith");
    }

    #[test]
    fn rejects_blank_username() {
        let err = User::new(UserId::new(1), "  ", "a@b.c", Role::Admin, "A").unwrap_err();
        assert_eq!(err, UserError::EmptyUsername);
    }

    #[test]
    fn rejects_blank_name() {
        let err = User::new(UserId::new(1), "admin", "a@b.c", Role::Admin, "").unwrap_err();
        assert_eq!(err, UserError::EmptyName);
    }

    #[test]
    fn role_display_is_lowercase() {
        assert_eq!(Role::Teacher.to_string(), "teacher");
    }
}
