use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    chain::{Block, BlockHeight},
    error::Error,
};

pub mod cache;
pub mod poller;
pub mod recent;

pub use cache::{BlockCache, decode_transactions};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 6;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    /// Seconds between `latest` block polls
    pub poll_interval_secs: Option<u64>,
    /// Per-request timeout for REST calls
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
                .max(1),
        )
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(crate::client::http::DEFAULT_REQUEST_TIMEOUT_SECS)
                .max(1),
        )
    }
}

/// Where blocks come from
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn latest_block(&self) -> Result<Block, Error>;

    async fn block_at(&self, height: BlockHeight) -> Result<Block, Error>;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, None, 6, 20)]
    #[case(Some(2), Some(5), 2, 5)]
    #[case(Some(0), Some(0), 1, 1)]
    fn durations_are_at_least_a_second(
        #[case] poll: Option<u64>,
        #[case] timeout: Option<u64>,
        #[case] poll_secs: u64,
        #[case] timeout_secs: u64,
    ) {
        let config = Config {
            poll_interval_secs: poll,
            request_timeout_secs: timeout,
        };

        assert_eq!(config.poll_interval(), Duration::from_secs(poll_secs));
        assert_eq!(config.request_timeout(), Duration::from_secs(timeout_secs));
    }
}
