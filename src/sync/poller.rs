use std::time::{Duration, Instant};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::{chain::BlockHeight, explorer::SharedExplorer};

const STATS_EVERY: usize = 100;

/// Poll the active session's node for its latest block once. The request is
/// made without holding the explorer lock; its result is dropped if the
/// session was replaced in the meantime.
pub async fn poll_once(explorer: &SharedExplorer) -> Option<BlockHeight> {
    let (session_id, client) = {
        let explorer = explorer.read().await;
        let session = explorer.session()?;
        (session.id(), session.client())
    };

    let result = client.latest_block().await;

    let mut explorer = explorer.write().await;

    let Some(session) = explorer.session_if_current(session_id) else {
        debug!(session = session_id, "session replaced during poll, dropping result");
        return None;
    };

    session.blocks_mut().record_fetch(result).map(|b| b.height())
}

/// Re-poll every `period` until the task is dropped
pub async fn run(explorer: SharedExplorer, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut stats = PollStats::new();

    info!(?period, "block poller started");

    loop {
        ticker.tick().await;

        let height = poll_once(&explorer).await;
        stats.poll_completed(height);
    }
}

pub struct PollStats {
    polls: usize,
    new_blocks: usize,
    last_height: Option<BlockHeight>,
    last_checkpoint: Instant,
}

impl Default for PollStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PollStats {
    pub fn new() -> Self {
        Self {
            polls: 0,
            new_blocks: 0,
            last_height: None,
            last_checkpoint: Instant::now(),
        }
    }

    pub fn poll_completed(&mut self, height: Option<BlockHeight>) {
        self.polls += 1;

        if height.is_some() && height != self.last_height {
            self.new_blocks += 1;
            self.last_height = height;
        }

        if self.polls % STATS_EVERY == 0 {
            let time_taken = self.last_checkpoint.elapsed();

            info!(
                height = self.last_height,
                "last {STATS_EVERY} polls in {time_taken:?} ({} new blocks)",
                self.new_blocks
            );

            self.new_blocks = 0;
            self.last_checkpoint = Instant::now();
        }
    }

    #[cfg(test)]
    fn new_blocks(&self) -> usize {
        self.new_blocks
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;

    use super::*;
    use crate::{
        chain::testing::block,
        client::{LATEST_BLOCK_PATH, RestClient, testing::MockRest},
        error::Error,
        explorer::{Connector, Explorer},
        prefs::Preferences,
        registry::{ChainConfig, ChainRegistry, Endpoint, Endpoints},
    };

    #[derive(Debug)]
    struct FixedLatest(serde_json::Value);

    impl Connector for FixedLatest {
        fn connect(&self, _address: &str) -> Result<Arc<dyn RestClient>, Error> {
            Ok(Arc::new(MockRest::new().with(LATEST_BLOCK_PATH, self.0.clone())))
        }
    }

    fn shared(latest: serde_json::Value) -> SharedExplorer {
        let mut registry = ChainRegistry::new();

        for name in ["epix", "cosmos"] {
            registry.insert(ChainConfig {
                chain_name: name.into(),
                endpoints: Endpoints {
                    rest: vec![Endpoint {
                        address: format!("https://api.{name}.io"),
                        provider: name.into(),
                    }],
                    ..Default::default()
                },
                ..Default::default()
            });
        }

        Explorer::new(
            registry,
            Preferences::in_memory(),
            IndexMap::new(),
            Arc::new(FixedLatest(latest)),
        )
        .into_shared()
    }

    #[tokio::test]
    async fn poll_applies_to_active_session() {
        let explorer = shared(serde_json::to_value(block("epix-1", 12, vec![])).unwrap());

        assert_eq!(poll_once(&explorer).await, None);

        explorer.write().await.select_chain("epix").unwrap();

        assert_eq!(poll_once(&explorer).await, Some(12));

        let explorer = explorer.read().await;
        let blocks = explorer.session().unwrap().blocks();
        assert_eq!(blocks.recents().len(), 1);
        assert!(blocks.connected());
    }

    #[tokio::test]
    async fn failed_poll_marks_disconnected() {
        let explorer = shared(serde_json::json!({ "unexpected": true }));
        explorer.write().await.select_chain("cosmos").unwrap();

        assert_eq!(poll_once(&explorer).await, None);

        let explorer = explorer.read().await;
        assert!(!explorer.session().unwrap().blocks().connected());
    }

    #[test]
    fn stats_count_distinct_heights() {
        let mut stats = PollStats::new();

        stats.poll_completed(Some(1));
        stats.poll_completed(Some(1));
        stats.poll_completed(None);
        stats.poll_completed(Some(2));

        assert_eq!(stats.new_blocks(), 2);
    }
}
