//! Persistence task
//!
//! Restores the last live notification at boot, then writes every
//! snapshot the coordinator publishes. Snapshots are latest-wins: if
//! several transitions happen during one flash write, only the newest is
//! written next. The history is only rewritten when it changed.

use defmt::*;

use herald_core::persist::RecordStore;
use herald_core::state::History;
use herald_core::Event;
use herald_hal_rp2040::Rp2040FlashStorage;

use crate::channels::{EVENT_CHANNEL, PERSIST};

#[embassy_executor::task]
pub async fn persist_task(mut store: RecordStore<Rp2040FlashStorage<'static>>, mut stored_history: History) {
    info!("Persistence task started");

    let restored = match store.load().await {
        Ok(Some(notification)) => {
            info!(
                "Restored {:?} notification (record {})",
                notification.status,
                store.sequence()
            );
            Some(notification)
        }
        Ok(None) => {
            debug!("Nothing to restore");
            None
        }
        Err(e) => {
            warn!("Failed to load notification record: {:?}", e);
            None
        }
    };
    EVENT_CHANNEL.send(Event::PersistenceLoaded(restored)).await;

    loop {
        let request = PERSIST.wait().await;
        match store.save(request.live.as_ref()).await {
            Ok(()) => debug!("Saved notification record {}", store.sequence()),
            // RAM state stays authoritative; the next transition writes again
            Err(e) => warn!("Failed to save notification record: {:?}", e),
        }

        if request.history != stored_history {
            match store.save_history(&request.history).await {
                Ok(()) => stored_history = request.history,
                Err(e) => warn!("Failed to save history: {:?}", e),
            }
        }
    }
}
