mod config;
mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use events::EventBus;
use ledger::{
    Address, BridgeClient, BridgeSigner, ErrorClassifier, FixedSigner, LedgerRpc,
    PropertyContract, Signer,
};
use orchestrator::{AccountOperations, RegistrationWorkflow, WorkflowContext};
use pinning::{PinningClient, PinningCredentials};
use propchain_core::{format_wei_as_eth, Property, PropertyId, RegistrationRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{PropchainConfig, CONFIG_FILE, PROPCHAIN_DIR};

#[derive(Parser)]
#[command(name = "propchain")]
#[command(about = "Register, verify and tokenize properties on the ledger", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Ledger bridge URL, overrides the config file
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Property contract address, overrides the config file
    #[arg(long, global = true)]
    contract: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .propchain/config.toml
    Init,
    /// Register a property and drive it through verification and minting
    Register {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        owner_id: String,
        /// Continue from the property's current status instead of registering
        #[arg(long)]
        resume: bool,
    },
    /// Show one property
    Show { id: u64 },
    /// List every registered property
    List,
    /// Show the most recently registered property
    Latest,
    /// Holdings and claimable rent of an account (the signer by default)
    Portfolio { address: Option<String> },
    /// Claim accumulated rent for a property
    Claim { id: u64 },
    /// Pay a property's rent with the tenant access code
    PayRent { id: u64, access_code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        return init_project().await;
    }

    init_tracing();

    let mut config = load_config().await?;
    if let Some(url) = cli.rpc_url {
        config.ledger.rpc_url = url;
    }
    if let Some(contract) = cli.contract {
        config.ledger.contract_address = contract;
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, cancelling");
            interrupt.cancel();
        }
    });

    let ctx = build_context(&config, cancel)?;

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Register {
            id,
            name,
            location,
            owner_id,
            resume,
        } => {
            let request = RegistrationRequest::new(PropertyId::new(id), name, location, owner_id)
                .context("Invalid registration request")?;
            register(ctx, &request, resume).await
        }
        Commands::Show { id } => show(&ctx.contract, PropertyId::new(id)).await,
        Commands::List => list(&ctx.contract).await,
        Commands::Latest => latest(&ctx.contract).await,
        Commands::Portfolio { address } => portfolio(ctx, address.as_deref()).await,
        Commands::Claim { id } => claim(ctx, PropertyId::new(id)).await,
        Commands::PayRent { id, access_code } => {
            pay_rent(ctx, PropertyId::new(id), &access_code).await
        }
    }
}

async fn init_project() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = PropchainConfig::config_path(&cwd);

    if config_path.exists() {
        println!("Already initialized at {}", config_path.display());
        return Ok(());
    }

    let path = PropchainConfig::default().save(&cwd).await?;

    println!();
    println!("Initialized propchain in {}", cwd.display());
    println!();
    println!("Created:");
    println!("  {}/", PROPCHAIN_DIR);
    println!("  └── {}", CONFIG_FILE);
    println!();
    println!("Next steps:");
    println!("  1. Set ledger.rpc_url and ledger.contract_address in {}", path.display());
    println!("  2. Export PINATA_API_KEY and PINATA_SECRET_API_KEY to pin metadata");
    println!("  3. Run 'propchain register --id <id> --name <name> \\");
    println!("       --location <location> --owner-id <owner>'");

    Ok(())
}

async fn load_config() -> Result<PropchainConfig> {
    let cwd = std::env::current_dir()?;
    match PropchainConfig::load(&cwd).await? {
        Some(config) => Ok(config),
        None => {
            println!("No {} directory found, using default configuration.", PROPCHAIN_DIR);
            println!("Run 'propchain init' to create one.");
            println!();
            Ok(PropchainConfig::default())
        }
    }
}

fn build_context(config: &PropchainConfig, cancel: CancellationToken) -> Result<WorkflowContext> {
    let contract_address = Address::parse(&config.ledger.contract_address)
        .context("Invalid contract address")?;

    let classifier = ErrorClassifier::new(config.ledger.oracle_not_ready_signatures.clone());
    let rpc: Arc<dyn LedgerRpc> = Arc::new(
        BridgeClient::new(&config.ledger.rpc_url, contract_address).with_classifier(classifier),
    );

    let signer: Arc<dyn Signer> = match &config.ledger.from {
        Some(from) => Arc::new(FixedSigner::new(
            Address::parse(from).context("Invalid signer address")?,
        )),
        None => Arc::new(BridgeSigner::new(Arc::clone(&rpc))),
    };

    let credentials = PinningCredentials::from_env();
    if credentials.is_none() {
        tracing::info!("No pinning credentials set, metadata will be embedded inline");
    }
    let store = PinningClient::new(&config.metadata.pinning_url, &config.metadata.gateway_url)
        .with_credentials(credentials);

    tracing::info!(
        rpc_url = %config.ledger.rpc_url,
        contract = %config.ledger.contract_address,
        "Ledger bridge"
    );

    Ok(WorkflowContext::new(
        PropertyContract::new(rpc),
        signer,
        Arc::new(store),
        config.workflow_config(),
    )
    .with_cancellation(cancel))
}

async fn register(ctx: WorkflowContext, request: &RegistrationRequest, resume: bool) -> Result<()> {
    let bus = EventBus::new();
    let progress = progress::spawn_progress(&bus);
    let workflow = RegistrationWorkflow::new(ctx.with_event_bus(bus));

    let outcome = if resume {
        workflow.resume(request).await
    } else {
        workflow.run(request).await
    };
    if let Err(e) = progress.await {
        tracing::warn!(error = %e, "Progress renderer stopped");
    }

    let report = match outcome {
        Ok(report) => report,
        Err(failure) => {
            if let Some(status) = failure.last_status {
                eprintln!("Last observed status: {}", style(status).yellow());
            }
            eprintln!("Re-run with --resume to continue from the current status.");
            return Err(failure)
                .context(format!("Workflow for property #{} failed", request.property_id));
        }
    };

    println!();
    println!("Property #{} is {}", report.property_id, style(report.final_status).green());
    for (stage, receipt) in &report.receipts {
        println!("  {:<16} {:<22} {}", stage, receipt.method, receipt.transaction_hash);
    }
    if let Some(metadata) = &report.metadata {
        if metadata.inline {
            println!("  Metadata embedded inline");
        } else {
            println!("  Metadata: {}", metadata.uri);
        }
    }
    println!();

    Ok(())
}

fn eth(wei: &str) -> String {
    format_wei_as_eth(wei)
        .map(|eth| format!("{} ETH", eth))
        .unwrap_or_else(|_| format!("{} wei", wei))
}

fn print_property(property: &Property) {
    println!("Property #{} [{}]", property.id, style(property.status).cyan());
    println!("  Name:     {}", property.name);
    println!("  Location: {}", property.location);
    println!("  Owner:    {}", property.owner_id);
    println!("  Price:    {}", eth(&property.price));
    println!("  Rent:     {}", eth(&property.rent));
}

async fn show(contract: &PropertyContract, id: PropertyId) -> Result<()> {
    let property = contract
        .get_property(id)
        .await
        .with_context(|| format!("Failed to read property #{}", id))?;
    print_property(&property);
    Ok(())
}

async fn list(contract: &PropertyContract) -> Result<()> {
    let ids = contract
        .all_property_ids()
        .await
        .context("Failed to list properties")?;

    if ids.is_empty() {
        println!("No properties registered yet.");
        return Ok(());
    }

    println!("Properties ({}):", ids.len());
    for id in ids {
        match contract.get_property(id).await {
            Ok(p) => println!(
                "  #{:<6} {:<11} {} ({})",
                p.id,
                p.status.as_str(),
                p.name,
                p.location
            ),
            Err(e) => println!("  #{:<6} {}", id, style(format!("unreadable: {}", e)).red()),
        }
    }
    Ok(())
}

async fn latest(contract: &PropertyContract) -> Result<()> {
    let ids = contract
        .all_property_ids()
        .await
        .context("Failed to list properties")?;

    match ids.last() {
        Some(id) => show(contract, *id).await,
        None => {
            println!("No properties registered yet.");
            Ok(())
        }
    }
}

async fn portfolio(ctx: WorkflowContext, address: Option<&str>) -> Result<()> {
    let owner = address
        .map(Address::parse)
        .transpose()
        .context("Invalid account address")?;

    let portfolio = AccountOperations::new(ctx)
        .portfolio(owner.as_ref())
        .await
        .context("Failed to load portfolio")?;

    println!("Account {}", portfolio.owner);
    if portfolio.holdings.is_empty() {
        println!("  No property tokens held.");
        return Ok(());
    }

    for holding in &portfolio.holdings {
        println!(
            "  #{:<6} {:<24} tokens: {:<8} claimable: {}",
            holding.property.id,
            holding.property.name,
            holding.balance,
            eth(&holding.available_rewards)
        );
    }
    println!("Total claimable: {}", style(eth(&portfolio.total_rewards)).green());
    Ok(())
}

async fn claim(ctx: WorkflowContext, id: PropertyId) -> Result<()> {
    let receipt = AccountOperations::new(ctx)
        .claim_rewards(id)
        .await
        .with_context(|| format!("Failed to claim rewards for property #{}", id))?;

    println!("{} Rewards claimed: {}", style("✔").green(), receipt.transaction_hash);
    Ok(())
}

async fn pay_rent(ctx: WorkflowContext, id: PropertyId, access_code: &str) -> Result<()> {
    let payment = AccountOperations::new(ctx)
        .pay_rent(id, access_code)
        .await
        .with_context(|| format!("Failed to pay rent for property #{}", id))?;

    println!(
        "{} Paid {} for property #{}: {}",
        style("✔").green(),
        eth(&payment.rent_paid_wei),
        id,
        payment.receipt.transaction_hash
    );
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "propchain=info,orchestrator=info,ledger=info,pinning=info".into()
            }),
        )
        .init();
}
