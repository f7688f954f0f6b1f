use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};

/// Address book entry an attendee resolves to.
///
/// Attendees without a resolvable email address are bookkeeping only and
/// are hidden from the externally visible event shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: ID,
    pub name: String,
    pub email: Option<String>,
}

impl Contact {
    pub fn new(name: &str, email: Option<&str>) -> Self {
        Self {
            id: Default::default(),
            name: name.to_string(),
            email: email.map(|e| e.to_string()),
        }
    }
}
