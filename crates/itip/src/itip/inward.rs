use skema_domain::{Alarm, Attendee, CalendarEvent, ItipEvent, ID};
use std::collections::HashSet;

/// One exception of an inward converted submission. `untouched` marks a
/// fall-out the client echoed back unchanged, which must not reach the
/// store again.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedException {
    pub event: CalendarEvent,
    pub untouched: bool,
}

/// An externally submitted event converted back into persistence-ready
/// mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct ItipSubmission {
    pub event: CalendarEvent,
    pub exceptions: Vec<SubmittedException>,
}

/// Converts a submitted iTIP shape against the currently persisted state.
///
/// `persisted_exceptions` is the persisted exception set of `current`
/// under the currently active filter, fall-outs included. `emailless`
/// names the persisted attendees without a resolvable email address,
/// which the external shape never saw and which get re-attached here.
///
/// Pure: both inputs are left alone and the result is built bottom-up,
/// the conversion is idempotent for identical inputs.
pub fn from_itip(
    submitted: ItipEvent,
    current: &CalendarEvent,
    persisted_exceptions: &[CalendarEvent],
    emailless: &HashSet<ID>,
    cal_user: &Attendee,
) -> ItipSubmission {
    // A non-recurring event cannot have exceptions
    let exceptions = if submitted.event.recurrence.is_none() {
        Vec::new()
    } else {
        submitted
            .exceptions
            .into_iter()
            .map(|exc| {
                let matched = persisted_exceptions
                    .iter()
                    .find(|p| exc.recurid.is_some() && p.recurid == exc.recurid);
                match matched {
                    // A fall-out the server already knows about came
                    // back unchanged. Restore the persisted record and
                    // keep it away from the store.
                    Some(p) if exc.is_deleted && p.is_deleted => SubmittedException {
                        event: p.clone(),
                        untouched: true,
                    },
                    Some(p) => SubmittedException {
                        event: convert_event(exc, p, emailless, cal_user),
                        untouched: false,
                    },
                    None => {
                        let mut baseline = current.clone();
                        baseline.id = None;
                        SubmittedException {
                            event: convert_event(exc, &baseline, emailless, cal_user),
                            untouched: false,
                        }
                    }
                }
            })
            .collect()
    };

    ItipSubmission {
        event: convert_event(submitted.event, current, emailless, cal_user),
        exceptions,
    }
}

fn convert_event(
    submitted: CalendarEvent,
    current: &CalendarEvent,
    emailless: &HashSet<ID>,
    cal_user: &Attendee,
) -> CalendarEvent {
    let mut event = submitted;

    event.organizer = event
        .organizer
        .or_else(|| current.organizer.clone())
        .or_else(|| Some(cal_user.user_id.clone()));

    // Undo the outward perspective: the transparency the client saw was
    // this attendee's personal one
    if !current.is_organizer(cal_user) {
        let submitted_transp = event.transp;
        if let Some(own) = Attendee::get_mut(&mut event.attendees, cal_user) {
            own.transp = Some(submitted_transp);
        }
        event.transp = current.transp;
    }

    // Email-less attendees never made it into the external shape, bring
    // them back unmodified
    for kept in current
        .attendees
        .iter()
        .filter(|a| emailless.contains(&a.user_id))
    {
        if Attendee::get(&event.attendees, kept).is_none() {
            event.attendees.push(kept.clone());
        }
    }

    // Capability tokens can never be taken from a submission
    for attendee in event.attendees.iter_mut() {
        attendee.status_authkey = Attendee::get(&current.attendees, attendee)
            .and_then(|cur| cur.status_authkey.clone());
    }

    event.alarms = reconcile_alarms(
        std::mem::take(&mut event.alarms),
        &current.alarms,
        current,
        cal_user,
    );
    event
}

/// Matches the submitted alarms against the persisted ones from the
/// calendar user's perspective. Acknowledge and snooze times are copied
/// forward onto the persisted alarm; a persisted shared alarm missing
/// from the submission is skipped for this user, a missing private one
/// is dropped. Leftover submitted alarms are new and get tagged with
/// their owner unless the calendar user organizes the event.
fn reconcile_alarms(
    submitted: Vec<Alarm>,
    current: &[Alarm],
    current_event: &CalendarEvent,
    cal_user: &Attendee,
) -> Vec<Alarm> {
    let mut pending = submitted;
    let mut merged = Vec::with_capacity(current.len() + pending.len());

    for cur in current {
        if !cur.is_for_attendee(cal_user) {
            // Never shown to this user, keep as is
            merged.push(cur.clone());
            continue;
        }
        match pending.iter().position(|a| a.same_trigger(cur)) {
            Some(pos) => {
                let submitted_alarm = pending.remove(pos);
                let mut kept = cur.clone();
                if submitted_alarm.acknowledged.is_some() {
                    kept.acknowledged = submitted_alarm.acknowledged;
                }
                if submitted_alarm.snoozed_until.is_some() {
                    kept.snoozed_until = submitted_alarm.snoozed_until;
                }
                merged.push(kept);
            }
            None if cur.attendee.is_none() => {
                let mut kept = cur.clone();
                kept.skip(cal_user);
                merged.push(kept);
            }
            None => {}
        }
    }

    for mut alarm in pending {
        if !current_event.is_organizer(cal_user) {
            alarm.attendee = Some(cal_user.user_id.clone());
        }
        merged.push(alarm);
    }
    merged
}

#[cfg(test)]
mod test {
    use super::*;
    use skema_domain::{AttendeeType, Recurid, Transparency};

    fn cal_user() -> Attendee {
        Attendee::new(ID::new(), AttendeeType::User)
    }

    fn persisted_base(cal_user: &Attendee) -> CalendarEvent {
        let mut event = CalendarEvent::new(ID::default());
        event.id = Some(ID::new());
        event.recurrence = Some(Default::default());
        event.attendees = vec![cal_user.clone().with_authkey(40)];
        event
    }

    #[test]
    fn discards_exceptions_of_non_recurring_events() {
        let user = cal_user();
        let mut current = persisted_base(&user);
        current.recurrence = None;

        let mut submitted = ItipEvent {
            event: current.clone(),
            exceptions: vec![current.clone()],
        };
        submitted.event.recurrence = None;

        let res = from_itip(submitted, &current, &[], &HashSet::new(), &user);
        assert!(res.exceptions.is_empty());
    }

    #[test]
    fn untouched_fallout_is_restored_and_flagged() {
        let user = cal_user();
        let current = persisted_base(&user);

        let mut fallout = current.clone();
        fallout.recurid = Some(Recurid::new(&current.uid, 5_000));
        fallout.is_deleted = true;
        fallout.summary = "server side state".into();

        let mut echoed = fallout.clone();
        echoed.summary = "client mangled this".into();

        let submitted = ItipEvent {
            event: current.clone(),
            exceptions: vec![echoed],
        };
        let res = from_itip(
            submitted,
            &current,
            std::slice::from_ref(&fallout),
            &HashSet::new(),
            &user,
        );
        assert_eq!(res.exceptions.len(), 1);
        assert!(res.exceptions[0].untouched);
        assert_eq!(res.exceptions[0].event.summary, "server side state");
    }

    #[test]
    fn reattaches_emailless_attendees() {
        let user = cal_user();
        let bookkeeping = Attendee::new(ID::new(), AttendeeType::Resource);
        let mut current = persisted_base(&user);
        current.attendees.push(bookkeeping.clone());

        let mut submitted = ItipEvent {
            event: current.clone(),
            exceptions: Vec::new(),
        };
        // The external shape never contained the email-less attendee
        submitted.event.attendees.retain(|a| !a.matches(&bookkeeping));

        let emailless: HashSet<ID> = vec![bookkeeping.user_id.clone()].into_iter().collect();
        let res = from_itip(submitted, &current, &[], &emailless, &user);
        let reattached = Attendee::get(&res.event.attendees, &bookkeeping)
            .expect("To re-attach the email-less attendee");
        assert_eq!(*reattached, bookkeeping);
    }

    #[test]
    fn restores_transparency_perspective() {
        let user = cal_user();
        let mut current = persisted_base(&user);
        current.organizer = Some(ID::new());
        current.transp = Transparency::Opaque;

        let mut submitted = ItipEvent {
            event: current.clone(),
            exceptions: Vec::new(),
        };
        submitted.event.transp = Transparency::Transparent;

        let res = from_itip(submitted, &current, &[], &HashSet::new(), &user);
        assert_eq!(res.event.transp, Transparency::Opaque);
        let own = Attendee::get(&res.event.attendees, &user).unwrap();
        assert_eq!(own.transp, Some(Transparency::Transparent));
    }

    #[test]
    fn submission_cannot_forge_authkeys() {
        let user = cal_user();
        let current = persisted_base(&user);
        let real_key = current.attendees[0].status_authkey.clone();

        let mut submitted = ItipEvent {
            event: current.clone(),
            exceptions: Vec::new(),
        };
        submitted.event.attendees[0].status_authkey = Some("forged".into());
        let mut intruder = Attendee::new(ID::new(), AttendeeType::User);
        intruder.status_authkey = Some("forged as well".into());
        submitted.event.attendees.push(intruder.clone());

        let res = from_itip(submitted, &current, &[], &HashSet::new(), &user);
        assert_eq!(res.event.attendees[0].status_authkey, real_key);
        let intruder = Attendee::get(&res.event.attendees, &intruder).unwrap();
        assert_eq!(intruder.status_authkey, None);
    }

    #[test]
    fn copies_ack_and_snooze_forward_and_tags_new_alarms() {
        let user = cal_user();
        let other = Attendee::new(ID::new(), AttendeeType::User);
        let mut current = persisted_base(&user);
        current.organizer = Some(other.user_id.clone());

        let mut shared = Alarm::new(15);
        shared.id = ID::new();
        let mut foreign = Alarm::new(30);
        foreign.attendee = Some(other.user_id.clone());
        let mut own_private = Alarm::new(45);
        own_private.attendee = Some(user.user_id.clone());
        current.alarms = vec![shared.clone(), foreign.clone(), own_private];

        let mut acked = Alarm::new(15);
        acked.acknowledged = Some(9_000);
        let brand_new = Alarm::new(60);
        let mut submitted = ItipEvent {
            event: current.clone(),
            exceptions: Vec::new(),
        };
        submitted.event.alarms = vec![acked, brand_new];

        let res = from_itip(submitted, &current, &[], &HashSet::new(), &user);
        let alarms = &res.event.alarms;
        // shared alarm kept with the ack copied onto the persisted record
        let kept = alarms.iter().find(|a| a.minutes_before == 15).unwrap();
        assert_eq!(kept.id, shared.id);
        assert_eq!(kept.acknowledged, Some(9_000));
        // the other attendee's alarm was never visible and survives
        assert!(alarms.iter().any(|a| a.minutes_before == 30));
        // the user's own private alarm was dropped from the submission
        assert!(!alarms.iter().any(|a| a.minutes_before == 45));
        // the new alarm belongs to the submitting attendee
        let added = alarms.iter().find(|a| a.minutes_before == 60).unwrap();
        assert_eq!(added.attendee, Some(user.user_id.clone()));
    }
}
