//! Chain Access Module
//!
//! Read-only access to the peer registry contract:
//! - `rpc`: JSON-RPC transport (`eth_call`)
//! - `contract`: ABI binding of the four view functions
//! - `reader`: assembles the API response from individual reads

pub mod contract;
pub mod reader;
pub mod rpc;

pub use contract::{ContractReader, PeerContract};
pub use reader::ChainReader;
pub use rpc::{RpcClient, RpcError};

/// Errors surfaced by the chain reader
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("failed to decode {function} result: {message}")]
    Decode {
        function: &'static str,
        message: String,
    },

    #[error("getEoa returned {actual} addresses for {expected} peer ids")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("chain reader is not configured (set rpc_url and contract_address)")]
    NotConfigured,
}

impl ChainError {
    /// True when the failure message indicates provider rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.to_string().to_lowercase().contains("rate limit")
    }
}
