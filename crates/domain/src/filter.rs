use crate::event::CalendarEvent;
use crate::shared::entity::ID;
use crate::timespan::TimeSpan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum RecurringScope {
    /// Base events and exceptions alike
    Any,
    /// Only events without a `recurid`
    BaseOnly,
    /// Only events with a `recurid`
    ExceptionsOnly,
}

impl Default for RecurringScope {
    fn default() -> Self {
        Self::Any
    }
}

/// Search criteria for calendar events.
///
/// Filter variants are derived with the builder methods instead of
/// mutating a shared filter while it is in use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    pub ids: Option<Vec<ID>>,
    pub calendar_ids: Option<Vec<ID>>,
    pub uid: Option<String>,
    pub timespan: Option<TimeSpan>,
    pub recurring: RecurringScope,
    pub exclude_uids: Vec<String>,
}

impl EventFilter {
    /// The same filter with period criteria disabled. Used when fetching
    /// recurrence exceptions so that fall-outs just outside a sync window
    /// are not mistaken for deletions.
    pub fn without_timespan(&self) -> Self {
        Self {
            timespan: None,
            ..self.clone()
        }
    }

    pub fn with_scope(&self, scope: RecurringScope) -> Self {
        Self {
            recurring: scope,
            ..self.clone()
        }
    }

    pub fn excluding_uids(&self, uids: Vec<String>) -> Self {
        Self {
            exclude_uids: uids,
            ..self.clone()
        }
    }

    pub fn matches(&self, event: &CalendarEvent) -> bool {
        if let Some(ids) = &self.ids {
            match &event.id {
                Some(id) if ids.contains(id) => {}
                _ => return false,
            }
        }
        if let Some(calendar_ids) = &self.calendar_ids {
            if !calendar_ids.contains(&event.calendar_id) {
                return false;
            }
        }
        if let Some(uid) = &self.uid {
            if *uid != event.uid {
                return false;
            }
        }
        if let Some(span) = &self.timespan {
            if !span.overlaps(event.start_ts, event.start_ts + event.duration) {
                return false;
            }
        }
        match self.recurring {
            RecurringScope::Any => {}
            RecurringScope::BaseOnly => {
                if event.recurid.is_some() {
                    return false;
                }
            }
            RecurringScope::ExceptionsOnly => {
                if event.recurid.is_none() {
                    return false;
                }
            }
        }
        if self.exclude_uids.contains(&event.uid) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub skip: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SortableField {
    StartTs,
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}
