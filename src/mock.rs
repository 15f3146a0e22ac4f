//! Mock Provider
//!
//! Synthetic data for running the dashboard without network access.
//! Values are random; only the shape matches real chain data.

use rand::Rng;

use crate::types::{ApiResponse, PeerId, PeerRecord, RoundInfo};

/// Exclusive upper bound for mock win counts
pub const MOCK_MAX_WINS: u64 = 100;

/// Exclusive upper bound for mock rounds
pub const MOCK_MAX_ROUND: u64 = 10;

/// Exclusive upper bound for mock stages
pub const MOCK_MAX_STAGE: u64 = 4;

/// Generate a response for `peer_ids` using the thread-local RNG
pub fn mock_data(peer_ids: &[PeerId]) -> ApiResponse {
    mock_data_with(&mut rand::thread_rng(), peer_ids)
}

/// Generate a response for `peer_ids` from the given RNG
pub fn mock_data_with<R: Rng>(rng: &mut R, peer_ids: &[PeerId]) -> ApiResponse {
    let peers = peer_ids
        .iter()
        .map(|peer_id| PeerRecord {
            peer_id: peer_id.clone(),
            wallet_address: random_address(rng),
            total_wins: rng.gen_range(0..MOCK_MAX_WINS),
        })
        .collect();

    ApiResponse {
        peers,
        round_info: RoundInfo {
            current_round: rng.gen_range(0..MOCK_MAX_ROUND),
            current_stage: rng.gen_range(0..MOCK_MAX_STAGE),
        },
    }
}

/// Random 20-byte address as `0x` + 40 lowercase hex chars
fn random_address<R: Rng>(rng: &mut R) -> String {
    let bytes: [u8; 20] = rng.gen();
    format!("0x{}", hex::encode(bytes))
}
