//! Chain Reader
//!
//! Resolves peer ids into wallet addresses and win counts, plus the current
//! round and stage. Every contract read goes through the retry policy.
//!
//! Read order:
//! 1. `getEoa` once for all peers
//! 2. `getTotalWins` per peer, sequentially, with a pacing delay before each
//! 3. `currentRound` and `currentStage` concurrently

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::contract::to_u64_saturating;
use super::{ChainError, ContractReader};
use crate::retry::{with_retry, RetryPolicy};
use crate::types::{ApiResponse, PeerId, PeerRecord, RoundInfo};

/// Assembles [`ApiResponse`]s from contract reads
pub struct ChainReader {
    contract: Arc<dyn ContractReader>,
    retry: RetryPolicy,
    /// Delay before each per-peer win count read
    pacing: Duration,
}

impl ChainReader {
    pub fn new(contract: Arc<dyn ContractReader>, retry: RetryPolicy, pacing: Duration) -> Self {
        Self {
            contract,
            retry,
            pacing,
        }
    }

    /// Fetch attributes for `peer_ids` (expected non-empty).
    ///
    /// `peers` in the result is index-aligned with `peer_ids`.
    pub async fn fetch_data(&self, peer_ids: &[PeerId]) -> Result<ApiResponse, ChainError> {
        let contract = &self.contract;

        let eoas = with_retry(&self.retry, "getEoa", || contract.get_eoa(peer_ids)).await?;
        if eoas.len() != peer_ids.len() {
            return Err(ChainError::LengthMismatch {
                expected: peer_ids.len(),
                actual: eoas.len(),
            });
        }

        // One at a time to stay under provider rate limits
        let mut wins = Vec::with_capacity(peer_ids.len());
        for peer_id in peer_ids {
            tokio::time::sleep(self.pacing).await;

            let win = with_retry(&self.retry, "getTotalWins", || {
                contract.get_total_wins(peer_id)
            })
            .await?;
            debug!("Peer {} has {} wins", peer_id, win);
            wins.push(win);
        }

        let (round, stage) = tokio::try_join!(
            with_retry(&self.retry, "currentRound", || contract.current_round()),
            with_retry(&self.retry, "currentStage", || contract.current_stage()),
        )?;

        let peers = peer_ids
            .iter()
            .zip(eoas)
            .zip(wins)
            .map(|((peer_id, eoa), win)| PeerRecord {
                peer_id: peer_id.clone(),
                wallet_address: eoa.to_checksum(None),
                total_wins: to_u64_saturating(win),
            })
            .collect();

        let round_info = RoundInfo {
            current_round: to_u64_saturating(round),
            current_stage: to_u64_saturating(stage),
        };

        info!(
            "⛓️  Fetched {} peers from chain (round {}, stage {})",
            peer_ids.len(),
            round_info.current_round,
            round_info.current_stage
        );

        Ok(ApiResponse { peers, round_info })
    }
}
