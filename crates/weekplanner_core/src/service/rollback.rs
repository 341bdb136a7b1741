//! Compensating-action runner shared by compound operations.
//!
//! # Responsibility
//! - Re-apply a prior state transition after a partially failed operation.
//! - Report failed compensation on the user-facing notification channel.
//!
//! # Invariants
//! - A failed action is notified and short-circuits; the checker is not run.
//! - A completed action returns the checker's verdict for the same value.

use crate::notify::Notifier;
use log::{error, warn};
use std::fmt::Display;

/// Title used for failed-compensation notifications.
pub const ROLLBACK_FAILED_TITLE: &str = "Rollback failed";

/// Runs `action` on `target` for `value` and verifies it with `checker`.
///
/// `target` is passed to both closures so the caller can compensate on one
/// field of itself while lending another (for example the notifier).
pub fn rollback<S, T, E, A, C>(
    target: &mut S,
    value: &T,
    action: A,
    checker: C,
    notifier: &dyn Notifier,
) -> bool
where
    S: ?Sized,
    T: Display + ?Sized,
    E: Display,
    A: FnOnce(&mut S, &T) -> Result<(), E>,
    C: FnOnce(&S, &T) -> bool,
{
    if let Err(err) = action(target, value) {
        error!("event=rollback module=service status=error error={err}");
        notifier.notify(
            ROLLBACK_FAILED_TITLE,
            &format!("Could not undo the operation for: {value} ({err})"),
        );
        return false;
    }

    let restored = checker(target, value);
    if !restored {
        warn!("event=rollback module=service status=unverified");
    }
    restored
}
