//! User entity and the contact view built on top of it

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// A registered user
///
/// Online state is not stored on the user; it comes from the presence registry
/// when a [`Contact`] is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, name: String, email: String) -> Self {
        Self {
            id,
            name,
            email: email.to_lowercase(),
            created_at: Utc::now(),
        }
    }

    /// Attach presence to produce the contact-list view
    pub fn into_contact(self, online: bool) -> Contact {
        Contact {
            id: self.id,
            name: self.name,
            email: self.email,
            online,
        }
    }
}

/// A user as shown in someone's contact list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub online: bool,
}
