//! Peer registry contract binding
//!
//! ABI for the four view functions the dashboard reads. Calls are encoded
//! with `alloy-sol-types` and sent as `eth_call` through [`RpcClient`].

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;

use super::rpc::RpcClient;
use super::ChainError;

sol! {
    function getEoa(string[] peerIds) external view returns (address[] eoas);
    function getTotalWins(string peerId) external view returns (uint256 wins);
    function currentRound() external view returns (uint256 round);
    function currentStage() external view returns (uint256 stage);
}

/// Read-only view of the peer registry contract
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Resolve peer ids to their EOAs, index-aligned with the input
    async fn get_eoa(&self, peer_ids: &[String]) -> Result<Vec<Address>, ChainError>;

    async fn get_total_wins(&self, peer_id: &str) -> Result<U256, ChainError>;

    async fn current_round(&self) -> Result<U256, ChainError>;

    async fn current_stage(&self) -> Result<U256, ChainError>;
}

/// Contract deployed at `address`, reached through an RPC endpoint
pub struct PeerContract {
    rpc: RpcClient,
    address: Address,
}

impl PeerContract {
    pub fn new(rpc: RpcClient, address: Address) -> Self {
        Self { rpc, address }
    }

    /// Encode `call`, execute it and decode the return values
    async fn read<C: SolCall + Send>(&self, call: C) -> Result<C::Return, ChainError> {
        let data = call.abi_encode();
        let output = self.rpc.eth_call(self.address, &data).await?;
        decode_returns::<C>(&output)
    }
}

#[async_trait]
impl ContractReader for PeerContract {
    async fn get_eoa(&self, peer_ids: &[String]) -> Result<Vec<Address>, ChainError> {
        let call = getEoaCall {
            peerIds: peer_ids.to_vec(),
        };
        Ok(self.read(call).await?.eoas)
    }

    async fn get_total_wins(&self, peer_id: &str) -> Result<U256, ChainError> {
        let call = getTotalWinsCall {
            peerId: peer_id.to_string(),
        };
        Ok(self.read(call).await?.wins)
    }

    async fn current_round(&self) -> Result<U256, ChainError> {
        Ok(self.read(currentRoundCall {}).await?.round)
    }

    async fn current_stage(&self) -> Result<U256, ChainError> {
        Ok(self.read(currentStageCall {}).await?.stage)
    }
}

fn decode_returns<C: SolCall>(output: &[u8]) -> Result<C::Return, ChainError> {
    C::abi_decode_returns(output, true).map_err(|e| ChainError::Decode {
        function: C::SIGNATURE,
        message: e.to_string(),
    })
}

/// Narrow a `uint256` to `u64`, saturating at `u64::MAX`
pub fn to_u64_saturating(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.as_limbs()[0]
    }
}
