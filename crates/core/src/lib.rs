pub mod bindings {
    pub mod erc20;
    pub mod nonce_holder;
    pub mod token_sale;
}

pub mod types {
    pub mod config_wrapper;
    pub mod deploy_result;
    pub mod sale_config;
}

pub mod utils {
    pub mod address;
    pub mod artifact;
    pub mod bridge;
    pub mod deploy;
    pub mod deployment_record;
    pub mod status;
    pub mod wallet;
}

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, utils::parse_ether};
use alloy::providers::ProviderBuilder;
use alloy_zksync::{provider::zksync_provider, wallet::ZksyncWallet};
use eyre::{Result, WrapErr, eyre};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use types::{config_wrapper::ConfigWrapper, deploy_result::DeployResult, sale_config::SaleConfig};
use utils::{
    address::predict_create_address,
    artifact::{DEFAULT_ARTIFACTS_DIR, ZkArtifact, load_artifact, resolve_factory_deps},
    bridge::{DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_DEPOSIT_AMOUNT, Deposit, ensure_l1_balance},
    deploy::{create_tx, ensure_code_at, send_create_tx},
    deployment_record::{DeploymentEntry, append_entry},
    status::{SaleStatus, read_sale_status},
    wallet::{PRIVATE_KEY_ENV, signer_from_env},
};

/// Everything needed for a deployment that can be checked without a network.
#[derive(Debug, Clone)]
pub struct PreparedDeployment {
    pub sale: SaleConfig,
    pub artifact: ZkArtifact,
    pub constructor_args: Bytes,
    pub factory_deps: Vec<Bytes>,
}

pub fn prepare_deployment(
    cw: &ConfigWrapper,
    network: &str,
    artifacts_dir: &Path,
) -> Result<PreparedDeployment> {
    let sale = SaleConfig::from_config(cw, network)?;
    let artifact = load_artifact(artifacts_dir, &sale.contract_name)?;
    // Encoded once: the same bytes are deployed and reported.
    let constructor_args = artifact.encode_constructor(&sale.constructor_args())?;
    let factory_deps = resolve_factory_deps(artifacts_dir, &artifact)?;
    debug!(
        "Loaded {} with {} factory deps",
        artifact.fully_qualified_name(),
        factory_deps.len()
    );

    Ok(PreparedDeployment {
        sale,
        artifact,
        constructor_args,
        factory_deps,
    })
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub network: String,
    pub artifacts_dir: PathBuf,
    /// Where deployment records are written; `None` disables them.
    pub deployments_dir: Option<PathBuf>,
    pub skip_deposit: bool,
    /// Overrides `[deposit] amount`, in ether.
    pub deposit_amount: Option<String>,
    pub private_key_env: String,
}

impl DeployOptions {
    pub fn new(network: &str) -> Self {
        Self {
            network: network.to_string(),
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            deployments_dir: None,
            skip_deposit: false,
            deposit_amount: None,
            private_key_env: PRIVATE_KEY_ENV.to_string(),
        }
    }

    fn deposit_amount(&self, cw: &ConfigWrapper) -> Result<String> {
        if let Some(amount) = &self.deposit_amount {
            return Ok(amount.clone());
        }
        Ok(cw
            .get_deposit_amount()?
            .unwrap_or_else(|| DEFAULT_DEPOSIT_AMOUNT.to_string()))
    }
}

/// Bridges funds to L2 and deploys the token sale with the configured
/// constructor arguments.
pub async fn deploy_token_sale(cw: &ConfigWrapper, opts: &DeployOptions) -> Result<DeployResult> {
    let prepared = prepare_deployment(cw, &opts.network, &opts.artifacts_dir)?;
    info!(
        "Running deploy script for the {} contract",
        prepared.artifact.contract_name
    );
    deploy_prepared(cw, opts, prepared).await
}

/// Deploys an already prepared sale. Settings are checked before the key is
/// read or any RPC is contacted.
pub async fn deploy_prepared(
    cw: &ConfigWrapper,
    opts: &DeployOptions,
    prepared: PreparedDeployment,
) -> Result<DeployResult> {
    let network = opts.network.as_str();
    let contract_name = prepared.artifact.contract_name.clone();

    let timeout = cw
        .get_deposit_timeout_secs()?
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT);
    let deposit_amount = if opts.skip_deposit {
        None
    } else {
        let amount_str = opts.deposit_amount(cw)?;
        let amount = parse_ether(&amount_str)
            .map_err(|e| eyre!("Invalid deposit amount {}: {}", amount_str, e))?;
        Some(amount)
    };

    let signer = signer_from_env(&opts.private_key_env)?;
    let deployer = signer.address();
    info!("Deployer: {}", deployer);

    let l1_rpc_url = cw.get_l1_rpc_url(network)?;
    let l2_rpc_url = cw.get_l2_rpc_url(network)?;
    let l1_provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer.clone()))
        .connect_http(l1_rpc_url.parse()?);
    let zk_provider = zksync_provider()
        .with_recommended_fillers()
        .wallet(ZksyncWallet::from(signer))
        .connect_http(l2_rpc_url.parse()?);

    ensure_code_at(&zk_provider, prepared.sale.token, "sale token").await?;

    let deposit_tx_hash = match deposit_amount {
        None => {
            info!("Skipping deposit, using existing L2 balance");
            None
        }
        Some(amount) => {
            ensure_l1_balance(&l1_provider, deployer, amount).await?;

            let deposit = Deposit::new(deployer, amount).with_timeout(timeout);
            Some(deposit.send_and_wait(&zk_provider, &l1_provider).await?)
        }
    };

    let predicted = predict_create_address(&zk_provider, deployer).await?;
    info!("Expecting {} at {}", contract_name, predicted);

    let tx = create_tx(
        deployer,
        &prepared.artifact.bytecode,
        &prepared.constructor_args,
        &prepared.factory_deps,
    )?;
    let (address, deploy_tx_hash) = send_create_tx(&zk_provider, tx, timeout)
        .await
        .wrap_err_with(|| format!("Failed to deploy {}", contract_name))?;
    if address != predicted {
        warn!(
            "{} was deployed to {} instead of the predicted {}",
            contract_name, address, predicted
        );
    }
    ensure_code_at(&zk_provider, address, &contract_name).await?;

    let explorer_url = cw
        .get_block_explorer_url(network)
        .ok()
        .map(|base| format!("{}/address/{}", base, address));

    let result = DeployResult {
        network: network.to_string(),
        contract_name,
        address,
        constructor_args: prepared.constructor_args,
        deployer,
        deploy_tx_hash,
        deposit_tx_hash,
        explorer_url,
    };

    if let Some(dir) = &opts.deployments_dir {
        record_deployment(dir, &prepared.artifact.source_name, &result);
    }

    Ok(result)
}

/// The contract is live by the time this runs, so a failed write is only
/// logged.
fn record_deployment(dir: &Path, source_name: &str, result: &DeployResult) {
    let deployed_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let entry = DeploymentEntry {
        address: result.address,
        tx_hash: result.deploy_tx_hash,
        constructor_args: result.constructor_args.clone(),
        deployer: result.deployer,
        deployed_at,
    };

    match append_entry(
        dir,
        &result.network,
        &result.contract_name,
        source_name,
        entry,
    ) {
        Ok(path) => info!("Deployment recorded in {}", path.display()),
        Err(e) => warn!(
            "{} was deployed to {} but recording it failed: {:#}",
            result.contract_name, result.address, e
        ),
    }
}

/// Reads how many tokens a deployed sale holds and the hard cap they imply.
pub async fn sale_status(
    cw: &ConfigWrapper,
    network: &str,
    sale: Address,
    token: Option<Address>,
) -> Result<SaleStatus> {
    let sale_config = SaleConfig::from_config(cw, network)?;
    let token = token.unwrap_or(sale_config.token);

    let rpc_url = cw.get_l2_rpc_url(network)?;
    let provider = ProviderBuilder::new().connect(&rpc_url).await?;

    read_sale_status(provider, sale, token, sale_config.tokens_per_native).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, address};
    use crate::utils::deployment_record::DeploymentRecord;

    const CONFIG: &str = r#"
        [networks.local]
        l1_rpc = "http://localhost:8545"
        l2_rpc = "http://localhost:3050"

        [deposit]
        amount = "0.01"

        [sale.default]
        token = "0xf4c9913282E45AF9694Bc247C4952E4a762A2Cb6"
        min_reserve = "0.0005"
        max_reserve = "2.5"
        tokens_per_native = "1000"
        vesting_period = 8640000
        vesting_period_counter = 86400
        lock_period = 432000
    "#;

    fn testdata() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/artifacts-zk")
    }

    #[test]
    fn test_prepare_deployment() {
        let cw = ConfigWrapper::from_str(CONFIG).unwrap();
        let prepared = prepare_deployment(&cw, "local", &testdata()).unwrap();

        assert_eq!(prepared.artifact.contract_name, "TokenSale");
        assert_eq!(prepared.constructor_args.to_vec(), prepared.sale.abi_encode());
        assert_eq!(prepared.factory_deps.len(), 2);
    }

    #[test]
    fn test_prepare_deployment_validates_before_loading() {
        let raw = format!("{}\n[sale.local]\nmin_reserve = \"3\"\n", CONFIG);
        let cw = ConfigWrapper::from_str(&raw).unwrap();

        // The artifacts directory is never touched.
        let err = prepare_deployment(&cw, "local", Path::new("does-not-exist")).unwrap_err();
        assert!(err.to_string().contains("must be less than sale.max_reserve"));
    }

    #[test]
    fn test_prepare_deployment_with_wrong_contract() {
        let raw = format!("{}\n[sale.local]\ncontract = \"VestingWallet\"\n", CONFIG);
        let cw = ConfigWrapper::from_str(&raw).unwrap();

        let err = prepare_deployment(&cw, "local", &testdata()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "VestingWallet constructor expects 2 arguments, got 7"
        );
    }

    #[test]
    fn test_deposit_amount_precedence() {
        let cw = ConfigWrapper::from_str(CONFIG).unwrap();
        let mut opts = DeployOptions::new("local");
        assert_eq!(opts.deposit_amount(&cw).unwrap(), "0.01");

        opts.deposit_amount = Some("0.5".to_string());
        assert_eq!(opts.deposit_amount(&cw).unwrap(), "0.5");

        let empty = ConfigWrapper::from_str("").unwrap();
        assert_eq!(DeployOptions::new("local").deposit_amount(&empty).unwrap(), "0.001");

        let unquoted = ConfigWrapper::from_str("[deposit]\namount = 1\n").unwrap();
        assert_eq!(DeployOptions::new("local").deposit_amount(&unquoted).unwrap(), "1");
    }

    #[tokio::test]
    async fn test_deploy_rejects_bad_deposit_settings() {
        let raw = CONFIG.replace("[deposit]", "[deposit]\ntimeout_secs = -5");
        let cw = ConfigWrapper::from_str(&raw).unwrap();
        let mut opts = DeployOptions::new("local");
        opts.artifacts_dir = testdata();
        opts.private_key_env = "SALE_DEPLOYER_TEST_NO_SUCH_KEY".to_string();

        // Reported before the missing key.
        let err = deploy_token_sale(&cw, &opts).await.unwrap_err();
        assert_eq!(err.to_string(), "deposit.timeout_secs must not be negative");
    }

    fn deployed() -> DeployResult {
        DeployResult {
            network: "zksync-sepolia".to_string(),
            contract_name: "TokenSale".to_string(),
            address: address!("0x640c33CB461cD8ec1934a36c6335294AcB0ADc13"),
            constructor_args: Bytes::from(vec![1u8; 32]),
            deployer: address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            deploy_tx_hash: B256::repeat_byte(0x85),
            deposit_tx_hash: None,
            explorer_url: None,
        }
    }

    #[test]
    fn test_record_deployment() {
        let dir = tempfile::tempdir().unwrap();
        record_deployment(dir.path(), "contracts/TokenSale.sol", &deployed());

        let path = DeploymentRecord::path(dir.path(), "zksync-sepolia", "TokenSale");
        let record = DeploymentRecord::load(&path).unwrap().unwrap();
        assert_eq!(record.entries.len(), 1);
        assert_eq!(record.entries[0].address, deployed().address);
    }

    #[test]
    fn test_record_deployment_tolerates_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = DeploymentRecord::path(dir.path(), "zksync-sepolia", "TokenSale");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        // Logged, not raised: the deploy result still reaches the caller.
        record_deployment(dir.path(), "contracts/TokenSale.sol", &deployed());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_deploy_fails_fast_on_invalid_sale() {
        let raw = format!("{}\n[sale.local]\nlock_period = 0\n", CONFIG);
        let cw = ConfigWrapper::from_str(&raw).unwrap();
        let mut opts = DeployOptions::new("local");
        opts.artifacts_dir = testdata();

        // Rejected before the key is read or any RPC is contacted.
        let err = deploy_token_sale(&cw, &opts).await.unwrap_err();
        assert_eq!(err.to_string(), "sale.lock_period must be greater than zero");
    }

    #[tokio::test]
    async fn test_deploy_requires_private_key() {
        let cw = ConfigWrapper::from_str(CONFIG).unwrap();
        let mut opts = DeployOptions::new("local");
        opts.artifacts_dir = testdata();
        opts.private_key_env = "SALE_DEPLOYER_TEST_NO_SUCH_KEY".to_string();

        let err = deploy_token_sale(&cw, &opts).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable SALE_DEPLOYER_TEST_NO_SUCH_KEY not set"
        );
    }
}
