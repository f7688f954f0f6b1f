mod inward;
mod migration;
mod outward;
mod prepare;

pub use inward::{from_itip, ItipSubmission, SubmittedException};
pub use migration::{diff_exceptions, ExceptionMigration, ExceptionUpdate, MigrationError};
pub use outward::{to_itip, to_itip_many};
pub use prepare::{prepare_exception, PrepareError};

use skema_domain::{Attendee, Contact, ID};
use skema_infra::SkemaContext;
use std::collections::HashSet;

/// The acting calendar user has to resolve to a real contact. Resources
/// cannot drive the facade.
pub(crate) async fn resolve_calendar_user(
    cal_user: &Attendee,
    ctx: &SkemaContext,
) -> Option<Contact> {
    if !cal_user.is_contact_type() {
        return None;
    }
    ctx.repos.contacts.find(&cal_user.user_id).await
}

/// Ids of the attendees which do not resolve to a contact with an email
/// address. Those are bookkeeping records: they are hidden from the
/// external shape and re-attached untouched on the way back in.
pub(crate) async fn emailless_attendees(
    attendees: &[Attendee],
    ctx: &SkemaContext,
) -> HashSet<ID> {
    let ids: Vec<ID> = attendees.iter().map(|a| a.user_id.clone()).collect();
    let contacts = ctx.repos.contacts.find_many(&ids).await;
    attendees
        .iter()
        .filter(|a| {
            !contacts
                .iter()
                .any(|c| c.id == a.user_id && c.email.is_some())
        })
        .map(|a| a.user_id.clone())
        .collect()
}
