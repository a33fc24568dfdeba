use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, B256, U256, utils::format_ether};
use alloy::providers::{Provider, WalletProvider};
use alloy_zksync::provider::{DepositRequest, ZksyncProviderWithWallet};
use eyre::{Result, WrapErr, bail};
use log::{debug, info};
use std::time::Duration;

pub const DEFAULT_DEPOSIT_AMOUNT: &str = "0.001";
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

/// An L1 -> L2 transfer of native currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub receiver: Address,
    pub amount: U256,
    pub timeout: Duration,
}

impl Deposit {
    pub fn new(receiver: Address, amount: U256) -> Self {
        Self {
            receiver,
            amount,
            timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Native currency deposit, no token set.
    pub fn request(&self) -> DepositRequest {
        DepositRequest::new(self.amount).with_receiver(self.receiver)
    }

    /// Bridges the funds and waits until the L2 side of the deposit is mined.
    /// Returns the L2 transaction hash.
    pub async fn send_and_wait<Z, L1>(&self, zk_provider: &Z, l1_provider: &L1) -> Result<B256>
    where
        Z: ZksyncProviderWithWallet,
        L1: Provider + WalletProvider,
    {
        info!(
            "Depositing {} ETH to {} on L2",
            format_ether(self.amount),
            self.receiver
        );

        let l1_receipt = zk_provider
            .deposit(&self.request(), l1_provider)
            .await
            .wrap_err("Deposit transaction failed on L1")?;
        debug!("Deposit accepted on L1, waiting for L2 execution");

        let l2_receipt = l1_receipt
            .get_l2_tx()?
            .with_required_confirmations(1)
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await
            .wrap_err("Deposit was not processed on L2")?;

        if !l2_receipt.status() {
            bail!(
                "Deposit L2 transaction {} reverted",
                l2_receipt.transaction_hash()
            );
        }

        info!(
            "Deposit processed on L2 in tx {}",
            l2_receipt.transaction_hash()
        );
        Ok(l2_receipt.transaction_hash())
    }
}

/// Fails fast when the L1 balance cannot cover the deposit.
pub async fn ensure_l1_balance<L1: Provider>(
    l1_provider: &L1,
    account: Address,
    amount: U256,
) -> Result<()> {
    let balance = l1_provider.get_balance(account).await?;
    debug!("L1 balance of {}: {} ETH", account, format_ether(balance));
    check_balance(balance, amount)
}

fn check_balance(balance: U256, amount: U256) -> Result<()> {
    if balance < amount {
        bail!(
            "Insufficient L1 balance: have {} ETH, deposit needs {} ETH plus fees",
            format_ether(balance),
            format_ether(amount)
        );
    }
    Ok(())
}
