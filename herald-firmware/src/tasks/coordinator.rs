//! Coordinator task
//!
//! Owns the state manager. Takes events from the inbound queue one at a
//! time, dispatches the resulting actions, and feeds expired timers back
//! into the same queue so they are ordered with everything else.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};

use herald_core::config::HeraldConfig;
use herald_core::state::{Actions, History};
use herald_core::{Action, StateManager};

use super::now_ms;
use crate::channels::{PersistRequest, ALERT, DISPLAY_BRIDGE, EVENT_CHANNEL, OSC_CHANNEL, PERSIST};

#[embassy_executor::task]
pub async fn coordinator_task(config: &'static HeraldConfig, history: History) {
    info!("Coordinator task started ({} history entries)", history.len());

    let mut manager = StateManager::new(config).with_history(history);
    let actions = manager.start(now_ms());
    dispatch(actions, manager.history());

    loop {
        let event = match manager.next_deadline() {
            Some(deadline) => {
                match select(
                    EVENT_CHANNEL.receive(),
                    Timer::at(Instant::from_millis(deadline)),
                )
                .await
                {
                    Either::First(event) => Some(event),
                    Either::Second(()) => None,
                }
            }
            None => Some(EVENT_CHANNEL.receive().await),
        };

        match event {
            Some(event) => {
                debug!("Event: {:?}", event);
                let actions = manager.handle(event, now_ms());
                dispatch(actions, manager.history());
            }
            None => {
                for event in manager.drain_expired(now_ms(), EVENT_CHANNEL.free_capacity()) {
                    if EVENT_CHANNEL.try_send(event).is_err() {
                        warn!("Event queue full, timer expiry dropped");
                    }
                }
            }
        }
    }
}

fn dispatch(actions: Actions, history: &History) {
    for action in actions {
        match action {
            Action::Persist(live) => PERSIST.signal(PersistRequest {
                live,
                history: history.clone(),
            }),
            Action::Display(command) => {
                if DISPLAY_BRIDGE.send(command) {
                    debug!(
                        "Undelivered display command replaced ({} so far)",
                        DISPLAY_BRIDGE.superseded()
                    );
                }
            }
            Action::Osc(message) => {
                if OSC_CHANNEL.try_send(message).is_err() {
                    warn!("OSC queue full, message dropped");
                }
            }
            Action::Alert(on) => ALERT.signal(on),
        }
    }
}
