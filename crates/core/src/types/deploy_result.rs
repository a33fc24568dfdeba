use alloy::primitives::{Address, B256, Bytes};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResult {
    pub network: String,
    pub contract_name: String,
    pub address: Address,
    /// ABI-encoded constructor arguments, as sent with the deployment.
    pub constructor_args: Bytes,
    pub deployer: Address,
    pub deploy_tx_hash: B256,
    /// L2 hash of the bridging deposit, when one was made.
    pub deposit_tx_hash: Option<B256>,
    pub explorer_url: Option<String>,
}

impl DeployResult {
    pub fn log_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{} was deployed to {}", self.contract_name, self.address),
            format!("Constructor params ABI: {}", self.constructor_args),
        ];
        if let Some(url) = &self.explorer_url {
            lines.push(format!("Explorer: {}", url));
        }
        lines
    }
}
