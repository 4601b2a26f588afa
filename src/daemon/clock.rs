//! Wall-clock tick source.

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

/// Sends the local wall-clock time once per second until the receiver is dropped.
///
/// Missed ticks (e.g. after the process was suspended) are skipped rather
/// than replayed; the next tick simply carries a later time.
pub fn spawn_wall_clock(tx: mpsc::Sender<NaiveDateTime>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if tx.send(Local::now().naive_local()).await.is_err() {
                debug!("Tick receiver dropped, stopping wall clock");
                break;
            }
        }
    })
}
