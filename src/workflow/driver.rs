//! Workflow driver: runs a category's steps in order.

use crate::book::Book;
use crate::error::SessionResult;

use super::fields::{descriptor, field_order, FieldDescriptor, FieldKind};
use super::generate::run_field;
use super::session::Session;

/// Which steps to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Only steps whose value is missing, plus menus and recipes whose
    /// target is missing.
    Populate,
    /// Every step, offering each existing value for confirmation.
    Confirm,
}

/// Whether `policy` runs `descriptor` for this book.
pub fn should_run(policy: Policy, descriptor: &FieldDescriptor, book: &Book) -> bool {
    match policy {
        Policy::Confirm => true,
        Policy::Populate => {
            matches!(descriptor.kind, FieldKind::Menu { .. }) || !book.has(descriptor.target())
        }
    }
}

/// Run every step of the book's category under `policy`.
pub fn run_workflow(session: &mut Session<'_>, policy: Policy) -> SessionResult<()> {
    let category = session.book.category;
    tracing::info!(book_id = session.book_id, %category, ?policy, "running workflow");

    for name in field_order(category) {
        let Some(descriptor) = descriptor(name) else {
            tracing::warn!(field = name, "unregistered field in category order");
            continue;
        };
        if should_run(policy, descriptor, &session.book) {
            run_field(session, descriptor)?;
        } else {
            tracing::debug!(field = name, "skipping field with a value");
        }
    }

    Ok(())
}
