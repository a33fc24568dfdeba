use crate::bindings::token_sale::TokenSale;
use crate::types::config_wrapper::ConfigWrapper;
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256, utils::parse_ether};
use alloy::sol_types::SolConstructor;
use eyre::{Result, bail, eyre};
use serde::Serialize;

pub const DEFAULT_CONTRACT_NAME: &str = "TokenSale";

/// Parameters of a token sale, in constructor order.
///
/// The hard cap is not part of the parameters. The sale contract derives it
/// from its own token balance and `tokens_per_native` when the sale starts,
/// so the contract must be funded with tokens after deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleConfig {
    pub contract_name: String,
    pub token: Address,
    /// Minimum contribution, in wei.
    pub min_reserve: U256,
    /// Maximum contribution, in wei.
    pub max_reserve: U256,
    /// Tokens per one unit of native currency, 18-decimal fixed point.
    pub tokens_per_native: U256,
    pub vesting_period: u64,
    pub vesting_period_counter: u64,
    pub lock_period: u64,
}

impl SaleConfig {
    pub fn from_config(cw: &ConfigWrapper, network: &str) -> Result<Self> {
        let contract_name = cw.get_sale_string_or(network, "contract", DEFAULT_CONTRACT_NAME)?;

        let token_str = cw.get_sale_string(network, "token")?;
        let token = token_str
            .parse::<Address>()
            .map_err(|_| eyre!("sale.token is not a valid address: {}", token_str))?;

        let config = Self {
            contract_name,
            token,
            min_reserve: parse_amount(cw, network, "min_reserve")?,
            max_reserve: parse_amount(cw, network, "max_reserve")?,
            tokens_per_native: parse_amount(cw, network, "tokens_per_native")?,
            vesting_period: cw.get_sale_seconds(network, "vesting_period")?,
            vesting_period_counter: cw.get_sale_seconds(network, "vesting_period_counter")?,
            lock_period: cw.get_sale_seconds(network, "lock_period")?,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token == Address::ZERO {
            bail!("sale.token must not be the zero address");
        }
        if self.min_reserve.is_zero() {
            bail!("sale.min_reserve must be greater than zero");
        }
        if self.min_reserve >= self.max_reserve {
            bail!(
                "sale.min_reserve ({}) must be less than sale.max_reserve ({})",
                self.min_reserve,
                self.max_reserve
            );
        }
        if self.tokens_per_native.is_zero() {
            bail!("sale.tokens_per_native must be greater than zero");
        }
        for (name, seconds) in [
            ("vesting_period", self.vesting_period),
            ("vesting_period_counter", self.vesting_period_counter),
            ("lock_period", self.lock_period),
        ] {
            if seconds == 0 {
                bail!("sale.{} must be greater than zero", name);
            }
        }
        if self.vesting_period_counter > self.vesting_period {
            bail!(
                "sale.vesting_period_counter ({}s) must not exceed sale.vesting_period ({}s)",
                self.vesting_period_counter,
                self.vesting_period
            );
        }

        Ok(())
    }

    /// Constructor arguments in declaration order.
    pub fn constructor_args(&self) -> Vec<DynSolValue> {
        vec![
            DynSolValue::Address(self.token),
            DynSolValue::Uint(self.min_reserve, 256),
            DynSolValue::Uint(self.max_reserve, 256),
            DynSolValue::Uint(self.tokens_per_native, 256),
            DynSolValue::Uint(U256::from(self.vesting_period), 256),
            DynSolValue::Uint(U256::from(self.vesting_period_counter), 256),
            DynSolValue::Uint(U256::from(self.lock_period), 256),
        ]
    }

    pub fn constructor_call(&self) -> TokenSale::constructorCall {
        TokenSale::constructorCall {
            token: self.token,
            minReserve: self.min_reserve,
            maxReserve: self.max_reserve,
            tokensPerNative: self.tokens_per_native,
            vestingPeriod: U256::from(self.vesting_period),
            vestingPeriodCounter: U256::from(self.vesting_period_counter),
            lockPeriod: U256::from(self.lock_period),
        }
    }

    /// Encodes the arguments against the known `TokenSale` constructor.
    pub fn abi_encode(&self) -> Vec<u8> {
        self.constructor_call().abi_encode()
    }
}

fn parse_amount(cw: &ConfigWrapper, network: &str, key: &str) -> Result<U256> {
    let raw = cw.get_sale_string(network, key)?;
    parse_ether(&raw).map_err(|e| eyre!("sale.{} is not a valid amount ({}): {}", key, raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn base_config() -> String {
        r#"
            [sale.default]
            token = "0xf4c9913282E45AF9694Bc247C4952E4a762A2Cb6"
            min_reserve = "0.0005"
            max_reserve = "2.5"
            tokens_per_native = "1000"
            vesting_period = 8640000
            vesting_period_counter = 86400
            lock_period = 432000
        "#
        .to_string()
    }

    fn with_override(key: &str, value: &str) -> ConfigWrapper {
        let raw = format!("{}\n[sale.test]\n{} = {}\n", base_config(), key, value);
        ConfigWrapper::from_str(&raw).unwrap()
    }

    #[test]
    fn test_from_config() {
        let cw = ConfigWrapper::from_str(&base_config()).unwrap();
        let sale = SaleConfig::from_config(&cw, "test").unwrap();

        assert_eq!(sale.contract_name, "TokenSale");
        assert_eq!(
            sale.token,
            address!("0xf4c9913282E45AF9694Bc247C4952E4a762A2Cb6")
        );
        assert_eq!(sale.min_reserve, U256::from(500_000_000_000_000u64));
        assert_eq!(sale.max_reserve, U256::from(2_500_000_000_000_000_000u64));
        assert_eq!(
            sale.tokens_per_native,
            U256::from(1000u64) * U256::from(10u64).pow(U256::from(18u64))
        );
        assert_eq!(sale.vesting_period, 86_400 * 100);
        assert_eq!(sale.vesting_period_counter, 86_400);
        assert_eq!(sale.lock_period, 86_400 * 5);
    }

    #[test]
    fn test_contract_name_override() {
        let cw = with_override("contract", "\"contracts/Sale.sol:TokenSaleV2\"");
        let sale = SaleConfig::from_config(&cw, "test").unwrap();
        assert_eq!(sale.contract_name, "contracts/Sale.sol:TokenSaleV2");
    }

    #[test]
    fn test_reserve_ordering_is_enforced() {
        let cw = with_override("min_reserve", "\"2.5\"");
        let err = SaleConfig::from_config(&cw, "test").unwrap_err();
        assert!(err.to_string().contains("must be less than sale.max_reserve"));

        let cw = with_override("max_reserve", "\"0.0001\"");
        assert!(SaleConfig::from_config(&cw, "test").is_err());
    }

    #[test]
    fn test_zero_values_are_rejected() {
        for (key, value, message) in [
            ("min_reserve", "\"0\"", "sale.min_reserve must be greater than zero"),
            (
                "tokens_per_native",
                "\"0\"",
                "sale.tokens_per_native must be greater than zero",
            ),
            ("lock_period", "0", "sale.lock_period must be greater than zero"),
            (
                "vesting_period_counter",
                "0",
                "sale.vesting_period_counter must be greater than zero",
            ),
            (
                "token",
                "\"0x0000000000000000000000000000000000000000\"",
                "sale.token must not be the zero address",
            ),
        ] {
            let cw = with_override(key, value);
            let err = SaleConfig::from_config(&cw, "test").unwrap_err();
            assert_eq!(err.to_string(), message, "override {key} = {value}");
        }
    }

    #[test]
    fn test_counter_longer_than_vesting_is_rejected() {
        let cw = with_override("vesting_period_counter", "8640001");
        let err = SaleConfig::from_config(&cw, "test").unwrap_err();
        assert!(err.to_string().contains("must not exceed sale.vesting_period"));
    }

    #[test]
    fn test_malformed_values() {
        let cw = with_override("max_reserve", "\"two\"");
        let err = SaleConfig::from_config(&cw, "test").unwrap_err();
        assert!(err.to_string().starts_with("sale.max_reserve is not a valid amount (two)"));

        let cw = with_override("token", "\"0x1234\"");
        let err = SaleConfig::from_config(&cw, "test").unwrap_err();
        assert_eq!(err.to_string(), "sale.token is not a valid address: 0x1234");

        let cw = with_override("lock_period", "\"5 days\"");
        assert!(SaleConfig::from_config(&cw, "test").is_err());
    }

    #[test]
    fn test_constructor_args_order() {
        let cw = ConfigWrapper::from_str(&base_config()).unwrap();
        let sale = SaleConfig::from_config(&cw, "test").unwrap();
        let args = sale.constructor_args();

        assert_eq!(args.len(), 7);
        assert_eq!(args[0], DynSolValue::Address(sale.token));
        assert_eq!(args[1], DynSolValue::Uint(sale.min_reserve, 256));
        assert_eq!(args[2], DynSolValue::Uint(sale.max_reserve, 256));
        assert_eq!(args[3], DynSolValue::Uint(sale.tokens_per_native, 256));
        assert_eq!(args[4], DynSolValue::Uint(U256::from(8_640_000u64), 256));
        assert_eq!(args[5], DynSolValue::Uint(U256::from(86_400u64), 256));
        assert_eq!(args[6], DynSolValue::Uint(U256::from(432_000u64), 256));
    }

    #[test]
    fn test_typed_encoding_matches_dynamic_encoding() {
        let cw = ConfigWrapper::from_str(&base_config()).unwrap();
        let sale = SaleConfig::from_config(&cw, "test").unwrap();

        let dynamic = DynSolValue::Tuple(sale.constructor_args()).abi_encode_params();
        let typed = sale.abi_encode();

        // Seven static words.
        assert_eq!(typed.len(), 7 * 32);
        assert_eq!(typed, dynamic);
        assert_eq!(&typed[12..32], sale.token.as_slice());
    }
}
