use dotenv::dotenv;
use eyre::{Result, eyre};
use std::{env, fs};
use toml::Value;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub struct ConfigWrapper {
    raw_config: Value,
}

impl ConfigWrapper {
    pub fn new(raw_config: Value) -> Self {
        Self { raw_config }
    }

    pub fn from_file(path: Option<&str>) -> Result<Self> {
        // `env:` values may come from `.env`.
        dotenv().ok();

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let config_content = fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read config file {}: {}", path, e))?;
        Self::from_str(&config_content)
    }

    pub fn from_str(config_content: &str) -> Result<Self> {
        let raw_config: Value = config_content.parse::<Value>()?;
        Ok(Self { raw_config })
    }

    /// Looks up `key` in `[sale.<network>]`, falling back to `[sale.default]`.
    pub fn get_sale_value(&self, network: &str, key: &str) -> Option<&Value> {
        let sale = self.raw_config.get("sale");
        sale.and_then(|s| s.get(network))
            .and_then(|s| s.get(key))
            .or_else(|| {
                sale.and_then(|s| s.get("default"))
                    .and_then(|s| s.get(key))
            })
    }

    pub fn get_sale_string(&self, network: &str, key: &str) -> Result<String> {
        let value = self
            .get_sale_value(network, key)
            .ok_or_else(|| eyre!("sale.{} not found for network: {}", key, network))?;

        match value {
            Value::String(s) => Ok(s.clone()),
            // Whole-number amounts are often written without quotes.
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            _ => Err(eyre!("sale.{} must be a string", key)),
        }
    }

    pub fn get_sale_string_or(&self, network: &str, key: &str, default: &str) -> Result<String> {
        match self.get_sale_value(network, key) {
            Some(_) => self.get_sale_string(network, key),
            None => Ok(default.to_string()),
        }
    }

    pub fn get_sale_seconds(&self, network: &str, key: &str) -> Result<u64> {
        let value = self
            .get_sale_value(network, key)
            .ok_or_else(|| eyre!("sale.{} not found for network: {}", key, network))?;

        let seconds = value
            .as_integer()
            .ok_or_else(|| eyre!("sale.{} must be an integer number of seconds", key))?;

        u64::try_from(seconds).map_err(|_| eyre!("sale.{} must not be negative", key))
    }

    fn get_network_str(&self, network: &str, key: &str) -> Result<&str> {
        self.raw_config
            .get("networks")
            .and_then(|n| n.get(network))
            .and_then(|n| n.get(key))
            .and_then(|v| v.as_str())
            .ok_or_else(|| eyre!("{} not found for network: {}", key, network))
    }

    pub fn get_l1_rpc_url(&self, network: &str) -> Result<String> {
        resolve_env(self.get_network_str(network, "l1_rpc")?)
    }

    pub fn get_l2_rpc_url(&self, network: &str) -> Result<String> {
        resolve_env(self.get_network_str(network, "l2_rpc")?)
    }

    pub fn get_block_explorer_url(&self, network: &str) -> Result<String> {
        let url_str = self.get_network_str(network, "block_explorer")?;
        Ok(url_str.trim_end_matches('/').to_string())
    }

    fn get_deposit_value(&self, key: &str) -> Option<&Value> {
        self.raw_config.get("deposit").and_then(|d| d.get(key))
    }

    /// `[deposit] amount` in ether, quoted or not.
    pub fn get_deposit_amount(&self) -> Result<Option<String>> {
        match self.get_deposit_value("amount") {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Integer(i)) => Ok(Some(i.to_string())),
            Some(Value::Float(f)) => Ok(Some(f.to_string())),
            Some(_) => Err(eyre!("deposit.amount must be a string or a number")),
        }
    }

    pub fn get_deposit_timeout_secs(&self) -> Result<Option<u64>> {
        let Some(value) = self.get_deposit_value("timeout_secs") else {
            return Ok(None);
        };

        let seconds = value
            .as_integer()
            .ok_or_else(|| eyre!("deposit.timeout_secs must be an integer number of seconds"))?;

        u64::try_from(seconds)
            .map(Some)
            .map_err(|_| eyre!("deposit.timeout_secs must not be negative"))
    }
}

/// Values written as `env:NAME` are read from the environment.
fn resolve_env(value: &str) -> Result<String> {
    resolve_with(value, |name| env::var(name).ok())
}

fn resolve_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    match value.strip_prefix("env:") {
        Some(env_var) => {
            lookup(env_var).ok_or_else(|| eyre!("Environment variable {} not set", env_var))
        }
        None => Ok(value.to_string()),
    }
}
