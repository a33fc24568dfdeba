use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, B256, Bytes, address};
use alloy::providers::Provider;
use alloy_zksync::network::{Zksync, transaction_request::TransactionRequest};
use eyre::{Result, WrapErr, bail, eyre};
use log::{debug, info};
use std::time::Duration;

/// System contract that handles every contract creation on zkSync.
pub const CONTRACT_DEPLOYER_ADDRESS: Address =
    address!("0x0000000000000000000000000000000000008006");

/// Builds the EIP-712 transaction that deploys `bytecode` through the
/// contract deployer.
pub fn create_tx(
    from: Address,
    bytecode: &Bytes,
    constructor_args: &Bytes,
    factory_deps: &[Bytes],
) -> Result<TransactionRequest> {
    TransactionRequest::default()
        .with_from(from)
        .with_to(CONTRACT_DEPLOYER_ADDRESS)
        .with_create_params(
            bytecode.to_vec(),
            constructor_args.to_vec(),
            factory_deps.iter().map(|dep| dep.to_vec()).collect(),
        )
        .map_err(|e| eyre!("Failed to build deployment transaction: {:?}", e))
}

/// Sends the deployment and waits for its receipt.
/// Returns the deployed address and the transaction hash.
pub async fn send_create_tx<P>(
    provider: &P,
    tx: TransactionRequest,
    timeout: Duration,
) -> Result<(Address, B256)>
where
    P: Provider<Zksync>,
{
    let pending = provider
        .send_transaction(tx)
        .await
        .wrap_err("Failed to submit deployment transaction")?;
    debug!("Deployment submitted in tx {}", pending.tx_hash());

    let receipt = pending
        .with_required_confirmations(1)
        .with_timeout(Some(timeout))
        .get_receipt()
        .await
        .wrap_err("Deployment transaction was not confirmed")?;

    if !receipt.status() {
        bail!(
            "Deployment transaction {} reverted",
            receipt.transaction_hash()
        );
    }

    let address = receipt.contract_address().ok_or_else(|| {
        eyre!(
            "Receipt of {} has no contract address",
            receipt.transaction_hash()
        )
    })?;

    info!("Contract deployed at {}", address);
    Ok((address, receipt.transaction_hash()))
}

/// Checks that `address` holds code, i.e. the deployment really landed there.
pub async fn ensure_code_at<P>(provider: &P, address: Address, what: &str) -> Result<()>
where
    P: Provider<Zksync>,
{
    let code = provider.get_code_at(address).await?;
    if code.is_empty() {
        bail!("No contract code found for {} at {}", what, address);
    }
    Ok(())
}
