//! Peer ID Source
//!
//! Reads the list of peer identifiers to display. The file is re-read on
//! every request so edits show up without a restart.

use std::path::Path;
use tracing::{debug, warn};

use crate::types::PeerId;

/// Load peer ids from a newline-delimited file.
///
/// Lines are trimmed and blank lines dropped. Any read failure is logged and
/// yields an empty list: callers treat that as "no peers configured".
pub async fn load_peer_ids(path: &Path) -> Vec<PeerId> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let ids = parse_peer_ids(&content);
            debug!("Loaded {} peer ids from {:?}", ids.len(), path);
            ids
        }
        Err(e) => {
            warn!("Error reading peer IDs from {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Split file content into trimmed, non-empty peer ids (order preserved)
pub fn parse_peer_ids(content: &str) -> Vec<PeerId> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
