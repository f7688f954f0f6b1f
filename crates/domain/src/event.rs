use crate::alarm::Alarm;
use crate::attendee::Attendee;
use crate::recurid::Recurid;
use crate::shared::entity::ID;
use crate::shared::recurrence::RRuleOptions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    Opaque,
    Transparent,
}

impl Default for Transparency {
    fn default() -> Self {
        Self::Opaque
    }
}

/// A calendar event as it is persisted.
///
/// A recurrence exception shares the `uid` of its base event and carries
/// a `recurid` naming the occurrence it replaces. A fall-out (occurrence
/// removed from the series) is an exception with `is_deleted` set. A base
/// event never carries a `recurid`.
///
/// `id` is `None` until the record has been persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Option<ID>,
    pub uid: String,
    pub summary: String,
    pub calendar_id: ID,
    pub organizer: Option<ID>,
    pub start_ts: i64,
    pub duration: i64,
    pub transp: Transparency,
    pub recurrence: Option<RRuleOptions>,
    /// Original start times excluded from recurrence expansion, both
    /// fall-outs and persisted exceptions
    pub exdates: Vec<i64>,
    pub recurid: Option<Recurid>,
    /// Version counter for optimistic concurrency
    pub seq: i64,
    pub is_deleted: bool,
    pub attendees: Vec<Attendee>,
    pub alarms: Vec<Alarm>,
    pub created: i64,
    pub updated: i64,
}

impl CalendarEvent {
    pub fn new(calendar_id: ID) -> Self {
        Self {
            uid: Uuid::new_v4().to_simple().to_string(),
            calendar_id,
            ..Default::default()
        }
    }

    pub fn ensure_uid(&mut self) {
        if self.uid.is_empty() {
            self.uid = Uuid::new_v4().to_simple().to_string();
        }
    }

    pub fn is_recur_exception(&self) -> bool {
        self.recurid.is_some()
    }

    /// The start time of the occurrence this event originally was. For a
    /// base event, or an exception that has not been keyed yet, this is
    /// the event's own start.
    pub fn original_start_ts(&self) -> i64 {
        match &self.recurid {
            Some(recurid) => recurid.original_start_ts,
            None => self.start_ts,
        }
    }

    pub fn is_organizer(&self, attendee: &Attendee) -> bool {
        match &self.organizer {
            Some(organizer) => *organizer == attendee.user_id,
            None => false,
        }
    }

    /// Makes sure the given calendar user takes part in this event,
    /// materializing an attendee record with a fresh capability token
    /// when they are missing.
    pub fn ensure_attendee(&mut self, cal_user: &Attendee, authkey_len: usize) {
        if Attendee::get(&self.attendees, cal_user).is_none() {
            self.attendees.push(
                Attendee::new(cal_user.user_id.clone(), cal_user.user_type)
                    .with_authkey(authkey_len),
            );
        }
    }
}

/// The externally visible iTIP shape of an event: the base event together
/// with its recurrence exceptions (fall-outs included). Exceptions are
/// never addressable as top level events, they only exist nested here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItipEvent {
    #[serde(flatten)]
    pub event: CalendarEvent,
    #[serde(rename = "exdate")]
    pub exceptions: Vec<CalendarEvent>,
}

impl ItipEvent {
    pub fn original_starts(&self) -> Vec<i64> {
        self.exceptions.iter().map(|e| e.original_start_ts()).collect()
    }

    /// Picks the display calendar for the given attendee on the base
    /// event and on every exception
    pub fn set_display_calendar(&mut self, calendar_id: &ID, attendee: &Attendee) {
        for event in std::iter::once(&mut self.event).chain(self.exceptions.iter_mut()) {
            if let Some(record) = Attendee::get_mut(&mut event.attendees, attendee) {
                record.display_calendar_id = Some(calendar_id.clone());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::attendee::AttendeeType;

    #[test]
    fn original_start_prefers_recurid() {
        let mut event = CalendarEvent::new(Default::default());
        event.start_ts = 2000;
        assert_eq!(event.original_start_ts(), 2000);

        event.recurid = Some(Recurid::new(&event.uid, 1000));
        assert_eq!(event.original_start_ts(), 1000);
    }

    #[test]
    fn ensure_attendee_materializes_missing_user() {
        let cal_user = Attendee::new(ID::new(), AttendeeType::User);
        let mut event = CalendarEvent::new(Default::default());

        event.ensure_attendee(&cal_user, 40);
        assert_eq!(event.attendees.len(), 1);
        let added = &event.attendees[0];
        assert_eq!(added.user_id, cal_user.user_id);
        assert!(added.status_authkey.is_some());

        // idempotent
        event.ensure_attendee(&cal_user, 40);
        assert_eq!(event.attendees.len(), 1);
    }

    #[test]
    fn set_display_calendar_covers_exceptions() {
        let cal_user = Attendee::new(ID::new(), AttendeeType::User);
        let display = ID::new();

        let mut base = CalendarEvent::new(Default::default());
        base.attendees = vec![cal_user.clone()];
        let mut exception = base.clone();
        exception.recurid = Some(Recurid::new(&base.uid, base.start_ts));

        let mut itip = ItipEvent {
            event: base,
            exceptions: vec![exception],
        };
        itip.set_display_calendar(&display, &cal_user);

        assert_eq!(
            itip.event.attendees[0].display_calendar_id,
            Some(display.clone())
        );
        assert_eq!(
            itip.exceptions[0].attendees[0].display_calendar_id,
            Some(display)
        );
    }
}
