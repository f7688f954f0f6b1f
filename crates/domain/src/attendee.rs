use crate::event::Transparency;
use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use skema_utils::create_random_secret;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeType {
    User,
    GroupMember,
    Resource,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum AttendeeStatus {
    NeedsAction,
    Accepted,
    Declined,
    Tentative,
}

impl Default for AttendeeStatus {
    fn default() -> Self {
        Self::NeedsAction
    }
}

/// A participant of a `CalendarEvent`.
///
/// `status_authkey` is an opaque capability token which allows this
/// attendee to update their own response status without having full edit
/// rights on the event. It is minted server side and must never be taken
/// from a client submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub user_id: ID,
    pub user_type: AttendeeType,
    pub status: AttendeeStatus,
    /// Calendar to show the event in, from this attendee's perspective
    pub display_calendar_id: Option<ID>,
    pub status_authkey: Option<String>,
    /// Personal transparency override of this attendee
    pub transp: Option<Transparency>,
}

impl Attendee {
    pub fn new(user_id: ID, user_type: AttendeeType) -> Self {
        Self {
            user_id,
            user_type,
            status: AttendeeStatus::default(),
            display_calendar_id: None,
            status_authkey: None,
            transp: None,
        }
    }

    pub fn with_authkey(mut self, authkey_len: usize) -> Self {
        self.status_authkey = Some(create_random_secret(authkey_len));
        self
    }

    /// Users and group members are the same person wearing different
    /// hats, so they match each other. Resources only match resources.
    pub fn matches(&self, other: &Attendee) -> bool {
        if self.user_id != other.user_id {
            return false;
        }
        match (self.user_type, other.user_type) {
            (AttendeeType::Resource, AttendeeType::Resource) => true,
            (AttendeeType::Resource, _) | (_, AttendeeType::Resource) => false,
            _ => true,
        }
    }

    /// Whether this attendee can act as a calendar user (a real contact)
    pub fn is_contact_type(&self) -> bool {
        matches!(
            self.user_type,
            AttendeeType::User | AttendeeType::GroupMember
        )
    }

    pub fn get<'a>(set: &'a [Attendee], target: &Attendee) -> Option<&'a Attendee> {
        set.iter().find(|a| a.matches(target))
    }

    pub fn get_mut<'a>(set: &'a mut [Attendee], target: &Attendee) -> Option<&'a mut Attendee> {
        set.iter_mut().find(|a| a.matches(target))
    }
}
