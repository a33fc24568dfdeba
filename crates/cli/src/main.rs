use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use eyre::Result;
use sale_deployer::{
    DeployOptions, deploy_prepared, prepare_deployment, sale_status,
    types::config_wrapper::ConfigWrapper,
    utils::{
        artifact::DEFAULT_ARTIFACTS_DIR, deployment_record::DEFAULT_DEPLOYMENTS_DIR,
        wallet::PRIVATE_KEY_ENV,
    },
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file
    #[arg(long = "config", short = 'c', global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bridge funds to L2 and deploy the token sale
    Deploy {
        /// Network name from the config file
        #[arg(long = "network", short = 'n')]
        network: String,

        /// Directory holding the compiled zkSync artifacts
        #[arg(long = "artifacts", short = 'a', default_value = DEFAULT_ARTIFACTS_DIR)]
        artifacts: PathBuf,

        /// Directory for deployment records
        #[arg(long = "deployments", default_value = DEFAULT_DEPLOYMENTS_DIR)]
        deployments: PathBuf,

        /// Do not write a deployment record
        #[arg(long = "no-record")]
        no_record: bool,

        /// Deploy with the existing L2 balance instead of bridging first
        #[arg(long = "skip-deposit")]
        skip_deposit: bool,

        /// Amount to bridge, in ether (overrides the config file)
        #[arg(long = "deposit-amount", conflicts_with = "skip_deposit")]
        deposit_amount: Option<String>,

        /// Environment variable holding the deployer private key
        #[arg(long = "private-key-env", default_value = PRIVATE_KEY_ENV)]
        private_key_env: String,

        /// Print the result as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Print the constructor ABI encoding without touching the network
    EncodeArgs {
        /// Network name from the config file
        #[arg(long = "network", short = 'n')]
        network: String,

        /// Directory holding the compiled zkSync artifacts
        #[arg(long = "artifacts", short = 'a', default_value = DEFAULT_ARTIFACTS_DIR)]
        artifacts: PathBuf,
    },
    /// Show the token funding and hard cap of a deployed sale
    Status {
        /// Network name from the config file
        #[arg(long = "network", short = 'n')]
        network: String,

        /// Address of the deployed sale
        #[arg(long = "sale", short = 's')]
        sale: Address,

        /// Token address (defaults to the configured sale token)
        #[arg(long = "token", short = 't')]
        token: Option<Address>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cw = ConfigWrapper::from_file(Some(cli.config.as_str()))?;

    match cli.command {
        Commands::Deploy {
            network,
            artifacts,
            deployments,
            no_record,
            skip_deposit,
            deposit_amount,
            private_key_env,
            json,
        } => {
            let opts = DeployOptions {
                network,
                artifacts_dir: artifacts,
                deployments_dir: (!no_record).then_some(deployments),
                skip_deposit,
                deposit_amount,
                private_key_env,
            };

            let prepared = prepare_deployment(&cw, &opts.network, &opts.artifacts_dir)?;
            if !json {
                println!(
                    "Running deploy script for the {} contract",
                    prepared.artifact.contract_name
                );
            }

            let result = deploy_prepared(&cw, &opts, prepared).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for line in result.log_lines() {
                    println!("{}", line);
                }
            }
        }
        Commands::EncodeArgs { network, artifacts } => {
            let prepared = prepare_deployment(&cw, &network, &artifacts)?;
            let sale = &prepared.sale;

            println!("Contract: {}", prepared.artifact.fully_qualified_name());
            println!("Token: {}", sale.token);
            println!("Min reserve: {} wei", sale.min_reserve);
            println!("Max reserve: {} wei", sale.max_reserve);
            println!("Tokens per native: {}", sale.tokens_per_native);
            println!("Vesting period: {}s", sale.vesting_period);
            println!("Vesting period counter: {}s", sale.vesting_period_counter);
            println!("Lock period: {}s", sale.lock_period);
            println!("Factory deps: {}", prepared.factory_deps.len());
            println!("Constructor params ABI: {}", prepared.constructor_args);
        }
        Commands::Status {
            network,
            sale,
            token,
        } => {
            let status = sale_status(&cw, &network, sale, token).await?;
            for line in status.describe()? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
