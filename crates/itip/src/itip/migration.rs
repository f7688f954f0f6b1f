use super::inward::SubmittedException;
use skema_domain::CalendarEvent;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionUpdate {
    /// The persisted counterpart
    pub current: CalendarEvent,
    /// The submitted state, with the persisted identifier re-attached
    pub event: CalendarEvent,
}

/// The create/update/delete partition between the persisted and the
/// submitted exception set of one update request. Computed fresh per
/// request and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExceptionMigration {
    pub to_delete: Vec<CalendarEvent>,
    pub to_create: Vec<CalendarEvent>,
    pub to_update: Vec<ExceptionUpdate>,
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Multiple recurrence exceptions share the original start time: {0}")]
    DataIntegrity(i64),
}

enum ExceptionAction {
    Create(CalendarEvent),
    Update(ExceptionUpdate),
    DoNotTouch,
}

/// Partitions the submitted exceptions against the persisted ones.
///
/// Both sets are expected to hold non-fall-outs only. The matching key
/// is the original occurrence start time, exact to the millisecond:
/// identifiers do not exist yet for brand new exceptions. Untouched
/// submissions are excluded from every set. A start time carried by
/// more than one exception of either set cannot be keyed and is a data
/// integrity fault: it is logged with the full payload and propagated,
/// never swallowed.
pub fn diff_exceptions(
    current: &[CalendarEvent],
    submitted: Vec<SubmittedException>,
) -> Result<ExceptionMigration, MigrationError> {
    let mut persisted: BTreeMap<i64, CalendarEvent> = BTreeMap::new();
    for exception in current {
        let key = exception.original_start_ts();
        if persisted.insert(key, exception.clone()).is_some() {
            error!(
                "Cannot key the persisted exceptions by original start time, duplicate at {}: {:?}",
                key, current
            );
            return Err(MigrationError::DataIntegrity(key));
        }
    }

    let mut seen: Vec<i64> = Vec::with_capacity(submitted.len());
    let mut actions = Vec::with_capacity(submitted.len());
    for submission in submitted {
        if submission.untouched {
            actions.push(ExceptionAction::DoNotTouch);
            continue;
        }
        let key = submission.event.original_start_ts();
        if seen.contains(&key) {
            error!(
                "Cannot key the submitted exceptions by original start time, duplicate at {}: {:?}",
                key, submission.event
            );
            return Err(MigrationError::DataIntegrity(key));
        }
        seen.push(key);
        match persisted.remove(&key) {
            Some(counterpart) => {
                let mut event = submission.event;
                event.id = counterpart.id.clone();
                actions.push(ExceptionAction::Update(ExceptionUpdate {
                    current: counterpart,
                    event,
                }));
            }
            None => actions.push(ExceptionAction::Create(submission.event)),
        }
    }

    let mut migration = ExceptionMigration {
        to_delete: persisted.into_iter().map(|(_, e)| e).collect(),
        ..Default::default()
    };
    for action in actions {
        match action {
            ExceptionAction::Create(event) => migration.to_create.push(event),
            ExceptionAction::Update(update) => migration.to_update.push(update),
            ExceptionAction::DoNotTouch => {}
        }
    }
    debug!(
        "Exceptions migration: {} to create, {} to update, {} to delete",
        migration.to_create.len(),
        migration.to_update.len(),
        migration.to_delete.len()
    );
    Ok(migration)
}
