use crate::bindings::erc20::ERC20;
use alloy::primitives::{Address, U256, utils::format_units};
use alloy::providers::Provider;
use eyre::{Result, eyre};
use log::warn;
use serde::Serialize;

const WEI_PER_NATIVE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Funding state of a deployed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleStatus {
    pub sale: Address,
    pub token: Address,
    pub token_symbol: String,
    pub token_decimals: u8,
    pub token_balance: U256,
    /// Native currency the sale accepts before it is sold out, in wei.
    pub hard_cap: U256,
}

impl SaleStatus {
    pub fn is_funded(&self) -> bool {
        !self.token_balance.is_zero()
    }

    pub fn describe(&self) -> Result<Vec<String>> {
        Ok(vec![
            format!("Sale: {}", self.sale),
            format!(
                "Token balance: {} {}",
                format_units(self.token_balance, self.token_decimals)?,
                self.token_symbol
            ),
            format!("Hard cap: {} ETH", format_units(self.hard_cap, "ether")?),
        ])
    }
}

/// Native amount that buys the whole `token_balance` at `tokens_per_native`.
pub fn implied_hard_cap(token_balance: U256, tokens_per_native: U256) -> Result<U256> {
    if tokens_per_native.is_zero() {
        return Err(eyre!("tokens_per_native must be greater than zero"));
    }
    token_balance
        .checked_mul(WEI_PER_NATIVE)
        .map(|scaled| scaled / tokens_per_native)
        .ok_or_else(|| eyre!("Token balance {} is too large", token_balance))
}

pub async fn read_sale_status<P: Provider>(
    provider: P,
    sale: Address,
    token: Address,
    tokens_per_native: U256,
) -> Result<SaleStatus> {
    let erc20 = ERC20::new(token, provider);

    let token_balance = erc20.balanceOf(sale).call().await?;
    let token_decimals = erc20.decimals().call().await?;
    let token_symbol = erc20.symbol().call().await?;

    let status = SaleStatus {
        sale,
        token,
        token_symbol,
        token_decimals,
        token_balance,
        hard_cap: implied_hard_cap(token_balance, tokens_per_native)?,
    };

    if !status.is_funded() {
        warn!(
            "Sale {} holds no {}: transfer tokens to it before starting the sale",
            sale, status.token_symbol
        );
    }

    Ok(status)
}
