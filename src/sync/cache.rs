use std::{sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use super::{
    BlockSource,
    recent::{RECENT_BLOCKS_CAPACITY, RecentBlocks},
};
use crate::{
    chain::{
        Block, BlockHeight,
        tx::{TxRecord, decode_record},
    },
    error::Error,
};

/// Used while there are not yet two distinct heights to measure between
pub const DEFAULT_BLOCK_TIME: Duration = Duration::from_secs(6);

/*
    Block Cache

    Tracks the chain tip as it is polled: the latest block, the block at which
    observation of the current chain started, and a window of recent blocks.
    Transactions in the window are decoded on demand and memoized against the
    window's fingerprint.
*/

#[derive(Debug)]
struct TxMemo {
    fingerprint: String,
    txs: Arc<[TxRecord]>,
}

impl Default for TxMemo {
    fn default() -> Self {
        Self {
            fingerprint: String::new(),
            txs: Arc::from(Vec::new()),
        }
    }
}

#[derive(Debug)]
pub struct BlockCache {
    latest: Option<Block>,
    earliest: Option<Block>,
    recents: RecentBlocks,
    memo: TxMemo,
    connected: bool,
}

impl Default for BlockCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockCache {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_BLOCKS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            latest: None,
            earliest: None,
            recents: RecentBlocks::new(capacity),
            memo: TxMemo::default(),
            connected: true,
        }
    }

    pub fn latest(&self) -> Option<&Block> {
        self.latest.as_ref()
    }

    pub fn earliest(&self) -> Option<&Block> {
        self.earliest.as_ref()
    }

    pub fn recents(&self) -> &RecentBlocks {
        &self.recents
    }

    /// Whether the last attempt to reach the node succeeded
    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn current_chain_id(&self) -> Option<&str> {
        self.latest.as_ref().map(|b| b.chain_id())
    }

    /// Ask the source for its latest block and fold it into the cache. A
    /// failure only marks the cache disconnected; it is not retried here.
    pub async fn fetch_latest<S>(&mut self, source: &S) -> Option<&Block>
    where
        S: BlockSource + ?Sized,
    {
        let result = source.latest_block().await;
        self.record_fetch(result)
    }

    /// Apply the outcome of a latest-block request made elsewhere
    pub fn record_fetch(&mut self, result: Result<Block, Error>) -> Option<&Block> {
        match result {
            Ok(block) => {
                if !self.connected {
                    info!(height = block.height(), "node reachable again");
                }
                self.connected = true;
                self.accept(block);
            }
            Err(e) => {
                if self.connected {
                    warn!(error = %e, "failed to fetch latest block, marking disconnected");
                } else {
                    debug!(error = %e, "still unable to fetch latest block");
                }
                self.connected = false;
            }
        }

        self.latest.as_ref()
    }

    fn accept(&mut self, block: Block) {
        let chain_switched = self
            .earliest
            .as_ref()
            .is_none_or(|earliest| earliest.chain_id() != block.chain_id());

        if chain_switched {
            info!(
                chain_id = block.chain_id(),
                height = block.height(),
                "starting new observation window"
            );
            self.earliest = Some(block.clone());
            self.clear_recent_blocks();
        }

        self.recents.push(block.clone());
        self.latest = Some(block);
    }

    /// Historical block lookup; does not touch the cached state
    pub async fn fetch_block<S>(&self, source: &S, height: BlockHeight) -> Result<Block, Error>
    where
        S: BlockSource + ?Sized,
    {
        source.block_at(height).await
    }

    pub fn clear_recent_blocks(&mut self) {
        self.recents.clear();
        self.memo = TxMemo::default();
    }

    /// Decoded transactions of every block in the window, highest block first.
    /// Repeated calls with an unchanged window return the same allocation.
    pub fn transactions_in_recents(&mut self) -> Arc<[TxRecord]> {
        let fingerprint = self.recents.fingerprint();

        if fingerprint == self.memo.fingerprint && !self.memo.txs.is_empty() {
            return self.memo.txs.clone();
        }

        let mut txs = self
            .recents
            .iter()
            .flat_map(decode_transactions)
            .collect::<Vec<_>>();

        // stable, so transactions keep block order within a height
        txs.sort_by(|a, b| b.height.cmp(&a.height));

        self.memo = TxMemo {
            fingerprint,
            txs: txs.into(),
        };

        self.memo.txs.clone()
    }

    /// Average time per block between the earliest and latest observed blocks
    pub fn blocktime(&self) -> Duration {
        let (Some(earliest), Some(latest)) = (&self.earliest, &self.latest) else {
            return DEFAULT_BLOCK_TIME;
        };

        let blocks = match latest.height().checked_sub(earliest.height()) {
            Some(n) if n > 0 => n,
            _ => return DEFAULT_BLOCK_TIME,
        };

        match (latest.time() - earliest.time()).to_std() {
            Ok(elapsed) => elapsed.div_f64(blocks as f64),
            Err(_) => DEFAULT_BLOCK_TIME,
        }
    }
}

/// Decode every non-empty transaction of a block, skipping (and logging)
/// entries that fail to decode
pub fn decode_transactions(block: &Block) -> Vec<TxRecord> {
    block
        .txs()
        .iter()
        .filter(|tx| !tx.trim().is_empty())
        .filter_map(|entry| {
            decode_record(block.height(), entry)
                .inspect_err(|e| {
                    warn!(
                        height = block.height(),
                        error = %e,
                        "skipping undecodable transaction"
                    )
                })
                .ok()
        })
        .collect()
}
