use alloy::primitives::{Address, B256, Bytes};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments-zk";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentEntry {
    pub address: Address,
    pub tx_hash: B256,
    pub constructor_args: Bytes,
    pub deployer: Address,
    /// Unix seconds.
    pub deployed_at: u64,
}

/// Deployment history of one contract on one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub source_name: String,
    pub entries: Vec<DeploymentEntry>,
}

impl DeploymentRecord {
    pub fn path(dir: &Path, network: &str, contract_name: &str) -> PathBuf {
        dir.join(network).join(format!("{}.json", contract_name))
    }

    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let record = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Malformed deployment record {}", path.display()))?;
        Ok(Some(record))
    }
}

/// Appends `entry` to the record at `<dir>/<network>/<contract>.json`.
pub fn append_entry(
    dir: &Path,
    network: &str,
    contract_name: &str,
    source_name: &str,
    entry: DeploymentEntry,
) -> Result<PathBuf> {
    let path = DeploymentRecord::path(dir, network, contract_name);

    let mut record = DeploymentRecord::load(&path)?.unwrap_or_else(|| DeploymentRecord {
        contract_name: contract_name.to_string(),
        source_name: source_name.to_string(),
        entries: Vec::new(),
    });
    record.entries.push(entry);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, serde_json::to_string_pretty(&record)?)
        .wrap_err_with(|| format!("Failed to write deployment record {}", path.display()))?;

    Ok(path)
}
