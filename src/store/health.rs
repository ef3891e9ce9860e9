/// Store connectivity tracking
///
/// The HTTP gate reads the flag synchronously before any route runs; a
/// background monitor keeps it current by pinging the pool.
use crate::{db, metrics};
use sqlx::SqlitePool;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::{task::JoinHandle, time::interval};
use tracing::{info, warn};

/// Shared handle reporting whether the cache store is connected
#[derive(Debug, Clone, Default)]
pub struct StoreHealth {
    connected: Arc<AtomicBool>,
}

impl StoreHealth {
    pub fn new(connected: bool) -> Self {
        let health = Self::default();
        health.set_connected(connected);
        health
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Update the flag, logging transitions. Returns the previous value.
    pub fn set_connected(&self, connected: bool) -> bool {
        let previous = self.connected.swap(connected, Ordering::AcqRel);
        metrics::STORE_CONNECTED.set(i64::from(connected));

        match (previous, connected) {
            (true, false) => warn!("Store connection lost"),
            (false, true) => info!("Store connection established"),
            _ => {}
        }

        previous
    }

    /// Ping the pool once, bounded by `timeout`, and record the result
    pub async fn probe(&self, pool: &SqlitePool, timeout: Duration) -> bool {
        let connected = matches!(
            tokio::time::timeout(timeout, db::test_connection(pool)).await,
            Ok(Ok(()))
        );
        self.set_connected(connected);
        connected
    }

    /// Start the periodic connectivity monitor
    pub fn spawn_monitor(
        &self,
        pool: SqlitePool,
        period: Duration,
        timeout: Duration,
    ) -> JoinHandle<()> {
        let health = self.clone();

        tokio::spawn(async move {
            info!(period_secs = period.as_secs(), "Starting store health monitor");
            let mut interval = interval(period);

            loop {
                interval.tick().await;
                health.probe(&pool, timeout).await;
            }
        })
    }
}
