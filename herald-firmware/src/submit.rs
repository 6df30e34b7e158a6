//! Submission entry point
//!
//! The HTTP front end calls [`submit`] for every request. Text is checked
//! here so a malformed request is answered immediately; everything else
//! happens on the coordinator.

use defmt::*;

use herald_core::notification::validate_text;
use herald_core::{Event, NotificationKind, SubmitError, SubmitOutcome};

use crate::channels::EVENT_CHANNEL;

/// Queue a notification for the state manager
#[allow(dead_code)] // called by the HTTP front end
pub fn submit(text: &str, kind: NotificationKind) -> SubmitOutcome {
    let outcome = enqueue(text, kind);
    if let Err(e) = outcome {
        info!("Submission rejected: {}", e.reason());
    }
    outcome.into()
}

fn enqueue(text: &str, kind: NotificationKind) -> Result<(), SubmitError> {
    let text = validate_text(text)?;
    EVENT_CHANNEL
        .try_send(Event::Submit { text, kind })
        .map_err(|_| SubmitError::Busy)
}
