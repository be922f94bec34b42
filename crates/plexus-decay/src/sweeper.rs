//! Scheduled decay task: a tokio interval loop with an explicit shutdown
//! handle, so the sweep is independently cancellable instead of running
//! as a perpetual background thread.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::manager::DecayManager;

pub struct DecaySweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl DecaySweeper {
    /// Spawn the sweep loop. The first sweep runs one full interval after
    /// startup, not immediately.
    pub fn spawn(manager: Arc<DecayManager>, interval: Duration) -> Self {
        let (shutdown, mut stop) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await; // immediate first tick

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match manager.sweep() {
                            Ok(report) if report.decayed > 0 => {
                                info!(decayed = report.decayed, "scheduled decay sweep applied");
                            }
                            Ok(_) => {}
                            Err(e) => warn!(error = %e, "decay sweep failed, will retry next tick"),
                        }
                    }
                    _ = stop.changed() => {
                        info!("decay sweeper stopping");
                        break;
                    }
                }
            }
        });
        Self { shutdown, handle }
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }

    /// Abort without waiting. Used on drop paths where awaiting is not
    /// possible.
    pub fn abort(&self) {
        self.handle.abort();
    }
}
