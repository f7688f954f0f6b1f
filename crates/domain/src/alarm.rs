use crate::attendee::Attendee;
use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};

/// A reminder attached to an event or to one attendee of an event.
///
/// An alarm without an `attendee` tag is shared by everybody on the
/// event; attendees opting out of it are tracked in `skipped_by`. An
/// alarm with an `attendee` tag is private to that attendee and must not
/// leak into other attendees' views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: ID,
    pub minutes_before: i64,
    /// Owning attendee, if the alarm is attendee scoped
    pub attendee: Option<ID>,
    /// When the alarm was acknowledged, in millis
    pub acknowledged: Option<i64>,
    /// Until when the alarm is snoozed, in millis
    pub snoozed_until: Option<i64>,
    pub skipped_by: Vec<ID>,
}

impl Alarm {
    pub fn new(minutes_before: i64) -> Self {
        Self {
            id: Default::default(),
            minutes_before,
            attendee: None,
            acknowledged: None,
            snoozed_until: None,
            skipped_by: Vec::new(),
        }
    }

    /// Whether this alarm belongs to the given calendar user's perspective
    pub fn is_for_attendee(&self, cal_user: &Attendee) -> bool {
        match &self.attendee {
            Some(owner) => *owner == cal_user.user_id,
            None => true,
        }
    }

    /// Whether this alarm should show up in the given calendar user's view
    pub fn applies_to(&self, cal_user: &Attendee) -> bool {
        self.is_for_attendee(cal_user) && !self.skipped_by.contains(&cal_user.user_id)
    }

    /// Alarms are reconciled between representations by their trigger
    pub fn same_trigger(&self, other: &Alarm) -> bool {
        self.minutes_before == other.minutes_before
    }

    pub fn skip(&mut self, cal_user: &Attendee) {
        if !self.skipped_by.contains(&cal_user.user_id) {
            self.skipped_by.push(cal_user.user_id.clone());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::attendee::AttendeeType;

    #[test]
    fn shared_alarm_applies_to_everybody() {
        let alarm = Alarm::new(15);
        let user = Attendee::new(ID::new(), AttendeeType::User);
        assert!(alarm.applies_to(&user));
    }

    #[test]
    fn scoped_alarm_is_private() {
        let owner = Attendee::new(ID::new(), AttendeeType::User);
        let other = Attendee::new(ID::new(), AttendeeType::User);
        let mut alarm = Alarm::new(15);
        alarm.attendee = Some(owner.user_id.clone());

        assert!(alarm.applies_to(&owner));
        assert!(!alarm.applies_to(&other));
    }

    #[test]
    fn skipped_alarm_is_hidden_for_that_user_only() {
        let a = Attendee::new(ID::new(), AttendeeType::User);
        let b = Attendee::new(ID::new(), AttendeeType::User);
        let mut alarm = Alarm::new(30);
        alarm.skip(&a);
        alarm.skip(&a);

        assert!(!alarm.applies_to(&a));
        assert!(alarm.applies_to(&b));
        assert_eq!(alarm.skipped_by.len(), 1);
    }
}
