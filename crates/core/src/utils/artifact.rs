//! Loading of compiled contract artifacts written by the zkSync hardhat
//! toolchain (`artifacts-zk/<source>/<Contract>.json`).

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use eyre::{Result, WrapErr, bail, eyre};
use log::debug;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts-zk";

/// Prefix of the `_format` written by zksolc-based toolchains.
const ZKSOLC_FORMAT_PREFIX: &str = "hh-zksolc";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkArtifact {
    #[serde(rename = "_format", default)]
    pub format: String,
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    /// Bytecode hash to fully qualified name (`path/To.sol:Name`).
    #[serde(default)]
    pub factory_deps: BTreeMap<String, String>,
}

impl ZkArtifact {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read artifact {}", path.display()))?;
        let artifact: ZkArtifact = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Malformed artifact {}", path.display()))?;
        // EraVM cannot run EVM bytecode.
        if !artifact.format.is_empty() && !artifact.format.starts_with(ZKSOLC_FORMAT_PREFIX) {
            bail!(
                "Artifact {} has format {}, compile it with zksolc",
                artifact.fully_qualified_name(),
                artifact.format
            );
        }
        if artifact.bytecode.is_empty() {
            bail!(
                "Artifact {} has no bytecode (abstract contract or interface?)",
                artifact.fully_qualified_name()
            );
        }
        Ok(artifact)
    }

    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// ABI-encodes constructor arguments against this artifact's constructor.
    pub fn encode_constructor(&self, args: &[DynSolValue]) -> Result<Bytes> {
        match self.abi.constructor() {
            Some(constructor) => {
                if constructor.inputs.len() != args.len() {
                    bail!(
                        "{} constructor expects {} arguments, got {}",
                        self.contract_name,
                        constructor.inputs.len(),
                        args.len()
                    );
                }
                let encoded = constructor.abi_encode_input(args).map_err(|e| {
                    eyre!(
                        "{} constructor arguments do not match its ABI: {}",
                        self.contract_name,
                        e
                    )
                })?;
                Ok(Bytes::from(encoded))
            }
            None if args.is_empty() => Ok(Bytes::new()),
            None => bail!(
                "{} has no constructor but {} arguments were given",
                self.contract_name,
                args.len()
            ),
        }
    }
}

/// Loads an artifact by bare contract name or by `path/To.sol:Name`.
pub fn load_artifact(artifacts_dir: &Path, name: &str) -> Result<ZkArtifact> {
    let path = find_artifact_path(artifacts_dir, name)?;
    debug!("Loading artifact {} from {}", name, path.display());
    ZkArtifact::from_file(&path)
}

fn find_artifact_path(artifacts_dir: &Path, name: &str) -> Result<PathBuf> {
    if !artifacts_dir.is_dir() {
        bail!(
            "Artifacts directory {} not found, compile the contracts first",
            artifacts_dir.display()
        );
    }

    if let Some((source, contract)) = name.rsplit_once(':') {
        let path = artifacts_dir.join(source).join(format!("{}.json", contract));
        if !path.is_file() {
            bail!("Artifact for {} not found at {}", name, path.display());
        }
        return Ok(path);
    }

    let file_name = format!("{}.json", name);
    let mut matches: Vec<PathBuf> = WalkDir::new(artifacts_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_str())
        .map(|entry| entry.into_path())
        .collect();

    match matches.len() {
        0 => Err(eyre!(
            "Artifact for contract {} not found in {}",
            name,
            artifacts_dir.display()
        )),
        1 => Ok(matches.remove(0)),
        _ => {
            let candidates = matches
                .iter()
                .filter_map(|p| p.parent())
                .filter_map(|p| p.strip_prefix(artifacts_dir).ok())
                .map(|p| format!("{}:{}", p.display(), name))
                .collect::<Vec<_>>()
                .join(", ");
            Err(eyre!(
                "Multiple artifacts for contract {}, use a fully qualified name: {}",
                name,
                candidates
            ))
        }
    }
}

/// Collects the bytecodes of every contract `artifact` may deploy, transitively.
pub fn resolve_factory_deps(artifacts_dir: &Path, artifact: &ZkArtifact) -> Result<Vec<Bytes>> {
    let mut visited = BTreeSet::new();
    let mut bytecodes = Vec::new();
    let mut queue: VecDeque<String> = artifact.factory_deps.values().cloned().collect();

    visited.insert(artifact.fully_qualified_name());

    while let Some(dep) = queue.pop_front() {
        if !visited.insert(dep.clone()) {
            continue;
        }
        if !dep.contains(':') {
            bail!("Factory dependency {} is not a fully qualified name", dep);
        }

        let dep_artifact = load_artifact(artifacts_dir, &dep).wrap_err_with(|| {
            format!(
                "Failed to resolve factory dependency of {}",
                artifact.contract_name
            )
        })?;
        queue.extend(dep_artifact.factory_deps.values().cloned());
        bytecodes.push(dep_artifact.bytecode);
    }

    debug!(
        "{} has {} factory dependencies",
        artifact.contract_name,
        bytecodes.len()
    );
    Ok(bytecodes)
}
