//! Core types for the peer wins API
//!
//! These types define the JSON contract between the HTTP endpoint and the
//! dashboard. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

// =============================================================================
// PRIMITIVE TYPES
// =============================================================================

/// Opaque peer identifier, as listed in the peer ids file
pub type PeerId = String;

/// Win counter as reported by the contract
pub type WinCount = u64;

/// Round or stage counter as reported by the contract
pub type Counter = u64;

// =============================================================================
// PEER RECORDS
// =============================================================================

/// On-chain attributes resolved for a single peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRecord {
    /// Peer identifier (unchanged from input)
    pub peer_id: PeerId,

    /// EOA registered for this peer, `0x` + 40 hex chars
    pub wallet_address: String,

    /// Total wins recorded by the contract
    pub total_wins: WinCount,
}

/// Coarse progress counters maintained by the contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundInfo {
    pub current_round: Counter,

    /// Stage within the current round (0-3 in practice)
    pub current_stage: Counter,
}

// =============================================================================
// API RESPONSES
// =============================================================================

/// Successful response of `GET /api/peer-wins`
///
/// `peers` is index-aligned with the peer ids that were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub peers: Vec<PeerRecord>,
    pub round_info: RoundInfo,
}

/// Error body returned with 404 and 500 responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short summary shown as the error heading
    pub error: String,

    /// Underlying failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Remediation hint, only set for rate limiting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorResponse {
    /// Error without details or suggestion
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            suggestion: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}
