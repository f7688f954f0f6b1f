use super::{IEventStore, StoreAction, StoreError};
use skema_domain::{Alarm, Attendee, CalendarEvent, EventFilter, SortOrder, SortableField, ID};
use skema_utils::create_random_secret;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

const DEFAULT_STATUS_AUTHKEY_LEN: usize = 40;

/// Reference store implementation used by the facade tests. Alarms are
/// kept in a side table and only attached on `get_alarms`, the event
/// rows themselves are stored alarm free.
pub struct InMemoryEventStore {
    authkey_len: usize,
    events: Mutex<Vec<CalendarEvent>>,
    alarms: Mutex<HashMap<ID, Vec<Alarm>>>,
    denied: Mutex<HashSet<ID>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::with_authkey_len(DEFAULT_STATUS_AUTHKEY_LEN)
    }

    pub fn with_authkey_len(authkey_len: usize) -> Self {
        Self {
            authkey_len,
            events: Mutex::new(Vec::new()),
            alarms: Mutex::new(HashMap::new()),
            denied: Mutex::new(HashSet::new()),
        }
    }

    /// Marks an event as inaccessible for the current user. Test hook
    /// for exercising the rights-violation paths.
    pub fn deny(&self, event_id: &ID) {
        self.denied.lock().unwrap().insert(event_id.clone());
    }

    fn is_denied(&self, event_id: &ID) -> bool {
        self.denied.lock().unwrap().contains(event_id)
    }

    fn mint_authkeys(&self, e: &mut CalendarEvent) {
        for attendee in e.attendees.iter_mut() {
            if attendee.status_authkey.is_none() {
                attendee.status_authkey = Some(create_random_secret(self.authkey_len));
            }
        }
    }

    fn detach_alarms(&self, e: &mut CalendarEvent) {
        if let Some(id) = &e.id {
            self.alarms
                .lock()
                .unwrap()
                .insert(id.clone(), std::mem::take(&mut e.alarms));
        }
    }

    fn event_id(e: &CalendarEvent) -> Result<ID, StoreError> {
        e.id.clone()
            .ok_or_else(|| StoreError::InvalidRecord("event has no id".into()))
    }

    fn store_exception(
        &self,
        exception: &CalendarEvent,
        is_fallout: bool,
    ) -> Result<CalendarEvent, StoreError> {
        let recurid = exception
            .recurid
            .clone()
            .ok_or_else(|| StoreError::InvalidRecord("exception has no recurid".into()))?;
        let mut events = self.events.lock().unwrap();
        let base = events
            .iter_mut()
            .find(|row| row.uid == exception.uid && row.recurid.is_none())
            .ok_or_else(|| {
                StoreError::InvalidRecord(format!("no base event with uid: {}", exception.uid))
            })?;
        if !base.exdates.contains(&recurid.original_start_ts) {
            base.exdates.push(recurid.original_start_ts);
            base.exdates.sort_unstable();
        }
        base.seq += 1;

        let mut stored = exception.clone();
        stored.id = Some(stored.id.unwrap_or_default());
        stored.is_deleted = is_fallout;
        self.mint_authkeys(&mut stored);
        self.detach_alarms(&mut stored);
        events.push(stored.clone());
        Ok(stored)
    }

    fn check_authkey(stored: &CalendarEvent, attendee: &Attendee, authkey: &str) -> bool {
        Attendee::get(&stored.attendees, attendee)
            .and_then(|a| a.status_authkey.as_deref())
            .map(|key| key == authkey)
            .unwrap_or(false)
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEventStore for InMemoryEventStore {
    async fn insert(&self, e: &CalendarEvent) -> Result<CalendarEvent, StoreError> {
        let mut stored = e.clone();
        stored.id = Some(stored.id.unwrap_or_default());
        stored.ensure_uid();
        self.mint_authkeys(&mut stored);
        self.detach_alarms(&mut stored);
        self.events.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn save(
        &self,
        e: &CalendarEvent,
        _check_busy_conflicts: bool,
    ) -> Result<CalendarEvent, StoreError> {
        let id = Self::event_id(e)?;
        if self.is_denied(&id) {
            return Err(StoreError::AccessDenied(id));
        }
        let mut events = self.events.lock().unwrap();
        let pos = events
            .iter()
            .position(|row| row.id.as_ref() == Some(&id))
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if events[pos].seq != e.seq {
            return Err(StoreError::Conflict {
                expected: events[pos].seq,
                got: e.seq,
            });
        }
        let mut stored = e.clone();
        stored.seq += 1;
        self.mint_authkeys(&mut stored);
        self.detach_alarms(&mut stored);
        events[pos] = stored.clone();
        if stored.recurid.is_some() {
            if let Some(base) = events
                .iter_mut()
                .find(|row| row.uid == stored.uid && row.recurid.is_none())
            {
                base.seq += 1;
            }
        }
        Ok(stored)
    }

    async fn find(&self, event_id: &ID) -> Result<CalendarEvent, StoreError> {
        if self.is_denied(event_id) {
            return Err(StoreError::AccessDenied(event_id.clone()));
        }
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id.as_ref() == Some(event_id) && !row.is_deleted)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(event_id.clone()))
    }

    async fn find_many(&self, event_ids: &[ID]) -> Result<Vec<CalendarEvent>, StoreError> {
        let events = self.events.lock().unwrap();
        Ok(event_ids
            .iter()
            .filter(|id| !self.is_denied(id))
            .filter_map(|id| {
                events
                    .iter()
                    .find(|row| row.id.as_ref() == Some(id) && !row.is_deleted)
                    .cloned()
            })
            .collect())
    }

    async fn find_all(
        &self,
        field: SortableField,
        order: SortOrder,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        let mut rows: Vec<CalendarEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|row| !row.is_deleted)
            .filter(|row| row.id.as_ref().map(|id| !self.is_denied(id)).unwrap_or(true))
            .cloned()
            .collect();
        rows.sort_by_key(|row| match field {
            SortableField::StartTs => row.start_ts,
            SortableField::Created => row.created,
            SortableField::Updated => row.updated,
        });
        if order == SortOrder::Desc {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn search(
        &self,
        filter: &EventFilter,
        _action: StoreAction,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|row| !row.is_deleted && filter.matches(row))
            .filter(|row| row.id.as_ref().map(|id| !self.is_denied(id)).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn search_ids(
        &self,
        filter: &EventFilter,
        action: StoreAction,
    ) -> Result<Vec<ID>, StoreError> {
        let rows = self.search(filter, action).await?;
        Ok(rows.into_iter().filter_map(|row| row.id).collect())
    }

    async fn search_uids(
        &self,
        filter: &EventFilter,
        action: StoreAction,
    ) -> Result<Vec<String>, StoreError> {
        let rows = self.search(filter, action).await?;
        let mut uids: Vec<String> = rows.into_iter().map(|row| row.uid).collect();
        uids.sort_unstable();
        uids.dedup();
        Ok(uids)
    }

    async fn delete(&self, event_ids: &[ID]) -> Result<Vec<CalendarEvent>, StoreError> {
        let mut events = self.events.lock().unwrap();
        // First pass checks every id so that a failure leaves the store
        // untouched
        for id in event_ids {
            if self.is_denied(id) {
                return Err(StoreError::AccessDenied(id.clone()));
            }
            if !events.iter().any(|row| row.id.as_ref() == Some(id)) {
                return Err(StoreError::NotFound(id.clone()));
            }
        }
        let mut deleted = Vec::with_capacity(event_ids.len());
        events.retain(|row| match &row.id {
            Some(id) if event_ids.contains(id) => {
                deleted.push(row.clone());
                false
            }
            _ => true,
        });
        Ok(deleted)
    }

    async fn create_recur_exception(
        &self,
        exception: &CalendarEvent,
        is_fallout: bool,
    ) -> Result<CalendarEvent, StoreError> {
        self.store_exception(exception, is_fallout)
    }

    async fn get_recur_exceptions(
        &self,
        base: &CalendarEvent,
        include_deleted: bool,
        filter: Option<&EventFilter>,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        if let Some(id) = &base.id {
            if self.is_denied(id) {
                return Err(StoreError::AccessDenied(id.clone()));
            }
        }
        let mut rows: Vec<CalendarEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.uid == base.uid && row.recurid.is_some())
            .filter(|row| include_deleted || !row.is_deleted)
            .filter(|row| row.id.as_ref().map(|id| !self.is_denied(id)).unwrap_or(true))
            .filter(|row| filter.map(|f| f.matches(row)).unwrap_or(true))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.original_start_ts());
        Ok(rows)
    }

    async fn attender_status_update(
        &self,
        event: &CalendarEvent,
        attendee: &Attendee,
        authkey: &str,
    ) -> Result<CalendarEvent, StoreError> {
        let id = Self::event_id(event)?;
        let mut events = self.events.lock().unwrap();
        let stored = events
            .iter_mut()
            .find(|row| row.id.as_ref() == Some(&id) && !row.is_deleted)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if !Self::check_authkey(stored, attendee, authkey) {
            return Err(StoreError::AccessDenied(id));
        }
        let own = Attendee::get_mut(&mut stored.attendees, attendee)
            .ok_or_else(|| StoreError::AccessDenied(id))?;
        own.status = attendee.status;
        own.transp = attendee.transp;
        own.display_calendar_id = attendee.display_calendar_id.clone();
        Ok(stored.clone())
    }

    async fn attender_status_create_recur_exception(
        &self,
        exception: &CalendarEvent,
        attendee: &Attendee,
        authkey: &str,
    ) -> Result<CalendarEvent, StoreError> {
        {
            let events = self.events.lock().unwrap();
            let base = events
                .iter()
                .find(|row| row.uid == exception.uid && row.recurid.is_none())
                .ok_or_else(|| {
                    StoreError::InvalidRecord(format!(
                        "no base event with uid: {}",
                        exception.uid
                    ))
                })?;
            if !Self::check_authkey(base, attendee, authkey) {
                let id = Self::event_id(base)?;
                return Err(StoreError::AccessDenied(id));
            }
        }
        let mut stored = self.store_exception(exception, false)?;
        {
            let mut events = self.events.lock().unwrap();
            if let Some(row) = events
                .iter_mut()
                .find(|row| row.id == stored.id)
            {
                if let Some(own) = Attendee::get_mut(&mut row.attendees, attendee) {
                    own.status = attendee.status;
                    own.transp = attendee.transp;
                    own.display_calendar_id = attendee.display_calendar_id.clone();
                }
                stored = row.clone();
            }
        }
        Ok(stored)
    }

    async fn get_alarms(&self, events: &mut [CalendarEvent]) -> Result<(), StoreError> {
        let alarms = self.alarms.lock().unwrap();
        for e in events.iter_mut() {
            if let Some(id) = &e.id {
                e.alarms = alarms.get(id).cloned().unwrap_or_default();
            }
        }
        Ok(())
    }

    async fn lookup_existing_event(
        &self,
        candidate: &CalendarEvent,
    ) -> Result<Option<CalendarEvent>, StoreError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|row| {
                row.uid == candidate.uid
                    && row.recurid.is_none()
                    && !row.is_deleted
                    && row.id.as_ref().map(|id| !self.is_denied(id)).unwrap_or(true)
            })
            .cloned())
    }
}
