use skema_domain::{EventFilter, RecurringScope, ID};
use skema_infra::{SkemaContext, StoreAction, StoreError};

/// Resolves the ids visible under the given filter: the matching base
/// events, plus matching exceptions whose base event is itself not in
/// the result set. A caller can be invited to a single occurrence of an
/// otherwise invisible series and still has to see that occurrence.
pub(crate) async fn visible_event_ids(
    filter: &EventFilter,
    action: StoreAction,
    ctx: &SkemaContext,
) -> Result<Vec<ID>, StoreError> {
    let base_filter = filter.with_scope(RecurringScope::BaseOnly);
    let mut ids = ctx.repos.events.search_ids(&base_filter, action).await?;
    let base_uids = ctx.repos.events.search_uids(&base_filter, action).await?;

    let exception_filter = filter
        .with_scope(RecurringScope::ExceptionsOnly)
        .excluding_uids(base_uids);
    let exception_ids = ctx
        .repos
        .events
        .search_ids(&exception_filter, action)
        .await?;

    for id in exception_ids {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod test {
    use super::*;
    use skema_domain::{CalendarEvent, Recurid};
    use skema_infra::{IEventStore, InMemoryEventStore, Repos, SkemaContext};
    use std::sync::Arc;

    #[tokio::test]
    async fn exceptions_of_invisible_base_events_stay_visible() {
        let store = Arc::new(InMemoryEventStore::new());
        let ctx = SkemaContext {
            repos: Repos {
                events: store.clone(),
                contacts: Arc::new(skema_infra::InMemoryContactRepo::new()),
            },
            config: Default::default(),
            sys: Arc::new(skema_infra::RealSys {}),
        };

        let mut private_base = CalendarEvent::new(ID::default());
        private_base.recurrence = Some(Default::default());
        let private_base = store.insert(&private_base).await.unwrap();
        let mut exception = private_base.clone();
        exception.id = None;
        exception.recurid = Some(Recurid::new(&private_base.uid, 1_000));
        let exception = store.create_recur_exception(&exception, false).await.unwrap();

        let visible_base = store.insert(&CalendarEvent::new(ID::default())).await.unwrap();

        store.deny(private_base.id.as_ref().unwrap());

        let ids = visible_event_ids(&EventFilter::default(), StoreAction::Get, &ctx)
            .await
            .unwrap();
        assert_eq!(
            ids,
            vec![visible_base.id.unwrap(), exception.id.unwrap()]
        );
    }

    #[tokio::test]
    async fn exceptions_of_visible_base_events_are_not_doubled() {
        let store = Arc::new(InMemoryEventStore::new());
        let ctx = SkemaContext {
            repos: Repos {
                events: store.clone(),
                contacts: Arc::new(skema_infra::InMemoryContactRepo::new()),
            },
            config: Default::default(),
            sys: Arc::new(skema_infra::RealSys {}),
        };

        let mut base = CalendarEvent::new(ID::default());
        base.recurrence = Some(Default::default());
        let base = store.insert(&base).await.unwrap();
        let mut exception = base.clone();
        exception.id = None;
        exception.recurid = Some(Recurid::new(&base.uid, 1_000));
        store.create_recur_exception(&exception, false).await.unwrap();

        let ids = visible_event_ids(&EventFilter::default(), StoreAction::Get, &ctx)
            .await
            .unwrap();
        assert_eq!(ids, vec![base.id.unwrap()]);
    }
}
