use std::path::PathBuf;
use std::process::ExitCode;

use bondhive_deployments::{
    format_maturity, parse_maturity, BondDeployment, DeploymentManifest, Environment,
};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "bondhive")]
#[command(about = "Inspect and validate the table of deployed BondHive bonds")]
struct Cli {
    /// Path to the deployment manifest
    #[arg(
        short,
        long,
        global = true,
        env = "BONDHIVE_DEPLOYMENTS",
        default_value = "deployments.toml"
    )]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every record in the manifest
    Check,
    /// List deployed bonds
    List {
        /// Only list one environment (testnet or mainnet)
        #[arg(short, long)]
        env: Option<Environment>,
    },
    /// Show a single bond
    Show {
        name: String,
        #[arg(short, long)]
        env: Environment,
    },
    /// Print the Unix timestamp of a maturity date, e.g. "27 Sept 2024, 08:00 GMT"
    Maturity { text: String },
    /// Print the canonical maturity date of a Unix timestamp
    Date { timestamp: u64 },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            let manifest = DeploymentManifest::load(&cli.manifest)?;
            let issues = manifest.validate();
            if !issues.is_empty() {
                for issue in &issues {
                    println!("{issue}");
                }
                error!(issues = issues.len(), "manifest is invalid");
                return Ok(ExitCode::FAILURE);
            }
            info!(records = manifest.entries().count(), "manifest is valid");
            println!("ok");
        }
        Commands::List { env } => {
            let manifest = DeploymentManifest::load(&cli.manifest)?;
            for (environment, deployment) in manifest.entries() {
                if env.is_some_and(|wanted| wanted != environment) {
                    continue;
                }
                println!(
                    "{:<8} {:<16} {} {}",
                    environment, deployment.name, deployment.contract_address, deployment.maturity_date
                );
            }
        }
        Commands::Show { name, env } => {
            let manifest = DeploymentManifest::load(&cli.manifest)?;
            let Some(deployment) = manifest.find(env, &name) else {
                error!(%env, %name, "bond not found");
                return Ok(ExitCode::FAILURE);
            };
            print_deployment(env, deployment);
        }
        Commands::Maturity { text } => {
            println!("{}", parse_maturity(&text)?);
        }
        Commands::Date { timestamp } => {
            println!("{}", format_maturity(timestamp)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_deployment(environment: Environment, deployment: &BondDeployment) {
    println!("name:               {}", deployment.name);
    println!("environment:        {environment}");
    println!("contract_address:   {}", deployment.contract_address);
    println!("bond_id:            {}", deployment.bond_id);
    println!("maturity_date:      {}", deployment.maturity_date);
    println!("maturity_timestamp: {}", deployment.maturity_timestamp);
}
