use alloy::signers::local::PrivateKeySigner;
use dotenv::dotenv;
use eyre::{Result, eyre};
use std::env;

pub const PRIVATE_KEY_ENV: &str = "DEPLOYER_PRIVATE_KEY";

/// Reads the deployer key from the environment (or `.env`).
pub fn signer_from_env(var: &str) -> Result<PrivateKeySigner> {
    dotenv().ok();
    signer_from_lookup(var, |name| env::var(name).ok())
}

fn signer_from_lookup(
    var: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PrivateKeySigner> {
    let key = lookup(var).ok_or_else(|| eyre!("Environment variable {} not set", var))?;
    parse_private_key(key.trim()).map_err(|_| eyre!("{} is not a valid private key", var))
}

pub fn parse_private_key(key: &str) -> Result<PrivateKeySigner> {
    let key = key.strip_prefix("0x").unwrap_or(key);
    Ok(key.parse::<PrivateKeySigner>()?)
}
