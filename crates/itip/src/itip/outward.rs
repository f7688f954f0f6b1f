use super::emailless_attendees;
use skema_domain::{Attendee, CalendarEvent, EventFilter, ItipEvent, ID};
use skema_infra::{SkemaContext, StoreError};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Converts a persisted event into its externally visible iTIP shape:
/// recurrence exceptions (fall-outs included) embedded, alarms resolved,
/// and the calendar user's perspective applied. The store is never
/// mutated.
pub async fn to_itip(
    event: CalendarEvent,
    cal_user: &Attendee,
    filter: Option<&EventFilter>,
    ctx: &SkemaContext,
) -> Result<ItipEvent, StoreError> {
    let mut base = event;
    let mut exceptions = if base.recurrence.is_some() {
        ctx.repos
            .events
            .get_recur_exceptions(&base, true, filter)
            .await?
    } else {
        Vec::new()
    };

    ctx.repos
        .events
        .get_alarms(std::slice::from_mut(&mut base))
        .await?;
    ctx.repos.events.get_alarms(&mut exceptions).await?;

    let emailless = {
        let mut attendees = base.attendees.clone();
        for exception in &exceptions {
            attendees.extend(exception.attendees.iter().cloned());
        }
        emailless_attendees(&attendees, ctx).await
    };

    let exceptions = exceptions
        .into_iter()
        .map(|e| externalize(e, cal_user, &emailless))
        .collect();
    Ok(ItipEvent {
        event: externalize(base, cal_user, &emailless),
        exceptions,
    })
}

/// Converts a whole collection. A member the caller has no access to is
/// dropped silently (it is free/busy visible at most), any other failure
/// degrades that member to an empty exception list instead of failing
/// the collection.
pub async fn to_itip_many(
    events: Vec<CalendarEvent>,
    cal_user: &Attendee,
    filter: Option<&EventFilter>,
    ctx: &SkemaContext,
) -> Vec<ItipEvent> {
    let mut converted = Vec::with_capacity(events.len());
    for event in events {
        match to_itip(event.clone(), cal_user, filter, ctx).await {
            Ok(itip) => converted.push(itip),
            Err(StoreError::AccessDenied(event_id)) => {
                debug!("Dropping the event with id: {}, no access", event_id);
            }
            Err(e) => {
                warn!(
                    "Could not convert the event with id: {:?}, keeping it without exceptions: {:?}",
                    event.id, e
                );
                converted.push(ItipEvent {
                    event,
                    exceptions: Vec::new(),
                });
            }
        }
    }
    converted
}

fn externalize(
    mut event: CalendarEvent,
    cal_user: &Attendee,
    emailless: &HashSet<ID>,
) -> CalendarEvent {
    // The external shape shows one attendee's view: their personal
    // transparency replaces the canonical one unless they organize the
    // event themselves
    if !event.is_organizer(cal_user) {
        if let Some(own) = Attendee::get(&event.attendees, cal_user) {
            if let Some(transp) = own.transp {
                event.transp = transp;
            }
        }
    }
    event.attendees.retain(|a| !emailless.contains(&a.user_id));
    // Only the calendar user's own capability token leaves the server
    for attendee in event.attendees.iter_mut() {
        if !attendee.matches(cal_user) {
            attendee.status_authkey = None;
        }
    }
    event.alarms.retain(|alarm| alarm.applies_to(cal_user));
    event
}

#[cfg(test)]
mod test {
    use super::*;
    use skema_domain::{Alarm, AttendeeType, Contact, Recurid, Transparency};
    use skema_infra::{setup_context, IEventStore};

    async fn contact_attendee(ctx: &SkemaContext, email: Option<&str>) -> Attendee {
        let contact = Contact::new("somebody", email);
        ctx.repos.contacts.insert(&contact).await.unwrap();
        Attendee::new(contact.id, AttendeeType::User)
    }

    #[tokio::test]
    async fn embeds_exceptions_and_fallouts() {
        let ctx = setup_context();
        let cal_user = contact_attendee(&ctx, Some("me@example.com")).await;

        let mut base = CalendarEvent::new(ID::default());
        base.recurrence = Some(Default::default());
        base.start_ts = 1_000;
        let base = ctx.repos.events.insert(&base).await.unwrap();

        let mut exc = base.clone();
        exc.id = None;
        exc.recurid = Some(Recurid::new(&base.uid, 1_000));
        ctx.repos
            .events
            .create_recur_exception(&exc, false)
            .await
            .unwrap();
        let mut fallout = base.clone();
        fallout.id = None;
        fallout.recurid = Some(Recurid::new(&base.uid, 2_000));
        ctx.repos
            .events
            .create_recur_exception(&fallout, true)
            .await
            .unwrap();

        let base = ctx.repos.events.find(base.id.as_ref().unwrap()).await.unwrap();
        let itip = to_itip(base, &cal_user, None, &ctx).await.unwrap();
        assert_eq!(itip.exceptions.len(), 2);
        assert!(!itip.exceptions[0].is_deleted);
        assert!(itip.exceptions[1].is_deleted);
    }

    #[tokio::test]
    async fn applies_attendee_perspective() {
        let ctx = setup_context();
        let mut cal_user = contact_attendee(&ctx, Some("me@example.com")).await;
        cal_user.transp = Some(Transparency::Transparent);
        let organizer = contact_attendee(&ctx, Some("boss@example.com")).await;

        let mut event = CalendarEvent::new(ID::default());
        event.organizer = Some(organizer.user_id.clone());
        event.transp = Transparency::Opaque;
        event.attendees = vec![organizer, cal_user.clone()];
        let event = ctx.repos.events.insert(&event).await.unwrap();

        let itip = to_itip(event, &cal_user, None, &ctx).await.unwrap();
        assert_eq!(itip.event.transp, Transparency::Transparent);
    }

    #[tokio::test]
    async fn hides_emailless_attendees_and_foreign_alarms() {
        let ctx = setup_context();
        let cal_user = contact_attendee(&ctx, Some("me@example.com")).await;
        let bookkeeping = contact_attendee(&ctx, None).await;
        let other = contact_attendee(&ctx, Some("other@example.com")).await;

        let mut event = CalendarEvent::new(ID::default());
        event.attendees = vec![cal_user.clone(), bookkeeping.clone(), other.clone()];
        let mut private_alarm = Alarm::new(10);
        private_alarm.attendee = Some(other.user_id.clone());
        event.alarms = vec![Alarm::new(15), private_alarm];
        let event = ctx.repos.events.insert(&event).await.unwrap();

        let itip = to_itip(event, &cal_user, None, &ctx).await.unwrap();
        assert_eq!(itip.event.attendees.len(), 2);
        assert!(Attendee::get(&itip.event.attendees, &bookkeeping).is_none());
        assert_eq!(itip.event.alarms.len(), 1);
        assert_eq!(itip.event.alarms[0].minutes_before, 15);
    }

    #[tokio::test]
    async fn collection_drops_denied_members() {
        let ctx = setup_context();
        let cal_user = contact_attendee(&ctx, Some("me@example.com")).await;

        let store = skema_infra::InMemoryEventStore::new();
        let visible = store.insert(&CalendarEvent::new(ID::default())).await.unwrap();
        let hidden = store.insert(&CalendarEvent::new(ID::default())).await.unwrap();
        store.deny(hidden.id.as_ref().unwrap());

        let ctx = SkemaContext {
            repos: skema_infra::Repos {
                events: std::sync::Arc::new(store),
                contacts: ctx.repos.contacts.clone(),
            },
            config: ctx.config.clone(),
            sys: ctx.sys.clone(),
        };

        // A denied base event fails exception lookup, which is the
        // access denied path of the member conversion
        let mut hidden = hidden;
        hidden.recurrence = Some(Default::default());
        let converted = to_itip_many(vec![visible, hidden], &cal_user, None, &ctx).await;
        assert_eq!(converted.len(), 1);
    }
}
