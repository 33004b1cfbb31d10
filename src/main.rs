//! swapdesk - command-line entry point
//!
//! Resolves one backend from the registry and runs a single contract
//! operation against it, printing the result as JSON.
//!
//! Credentials come from the YAML file given with `--config` (blank fields
//! are filled from `<NAME>_API_KEY`-style environment variables) or, without
//! a file, from the environment alone.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use swapdesk::adapters::{CreateOrder, ExchangeAdapter, ExchangeRateRequest, Registry};
use swapdesk::config::{self, logging::init_logging, ExchangeConfig};

/// swapdesk - quotes, orders and order status across instant-swap backends.
#[derive(Parser, Debug)]
#[command(name = "swapdesk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Dump backend HTTP traffic through the logger
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered backends
    Backends,

    /// Limits + estimate + derived rate for a pair
    Quote(AmountArgs),

    /// Minimum / maximum amount for a pair
    Limits(PairArgs),

    /// Single-shot estimate for a pair and amount
    Estimate(AmountArgs),

    /// Currencies the backend currently trades
    Currencies(BackendArg),

    /// Create a swap order
    CreateOrder(CreateOrderArgs),

    /// Current status of an order
    Status(StatusArgs),
}

#[derive(Args, Debug)]
struct BackendArg {
    /// Backend name (see `swapdesk backends`)
    backend: String,
}

#[derive(Args, Debug)]
struct PairArgs {
    backend: String,
    from: String,
    to: String,
}

#[derive(Args, Debug)]
struct AmountArgs {
    backend: String,
    from: String,
    to: String,
    amount: f64,
}

#[derive(Args, Debug)]
struct CreateOrderArgs {
    backend: String,
    #[arg(long)]
    from: String,
    #[arg(long)]
    to: String,
    #[arg(long)]
    amount: f64,
    /// Payout address
    #[arg(long)]
    address: String,
    #[arg(long)]
    extra_id: Option<String>,
    #[arg(long)]
    refund_address: Option<String>,
    #[arg(long)]
    refund_extra_id: Option<String>,
}

#[derive(Args, Debug)]
struct StatusArgs {
    backend: String,
    order_id: String,
    /// Backend-specific lookup arguments (e.g. the FixedFloat order token)
    extra: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let registry = Registry::with_builtin();

    match &cli.command {
        Command::Backends => print_json(&registry.names()),
        Command::Quote(args) => {
            let adapter = resolve(&registry, &cli, &args.backend)?;
            let request = ExchangeRateRequest::new(&args.from, &args.to, args.amount);
            print_json(&adapter.get_exchange_rate_info(&request).await?)
        }
        Command::Limits(args) => {
            let adapter = resolve(&registry, &cli, &args.backend)?;
            print_json(&adapter.query_limits(&args.from, &args.to).await?)
        }
        Command::Estimate(args) => {
            let adapter = resolve(&registry, &cli, &args.backend)?;
            let request = ExchangeRateRequest::new(&args.from, &args.to, args.amount);
            print_json(&adapter.estimate_amount(&request).await?)
        }
        Command::Currencies(args) => {
            let adapter = resolve(&registry, &cli, &args.backend)?;
            print_json(&adapter.query_active_currencies().await?)
        }
        Command::CreateOrder(args) => {
            let adapter = resolve(&registry, &cli, &args.backend)?;
            let order = CreateOrder {
                from_currency: args.from.clone(),
                to_currency: args.to.clone(),
                invoiced_amount: args.amount,
                destination_address: args.address.clone(),
                extra_id: args.extra_id.clone(),
                refund_address: args.refund_address.clone(),
                refund_extra_id: args.refund_extra_id.clone(),
            };
            let created = adapter.create_order(&order).await?;
            info!(exchange = adapter.exchange_name(), order_id = %created.uuid, "Order submitted");
            print_json(&created)
        }
        Command::Status(args) => {
            let adapter = resolve(&registry, &cli, &args.backend)?;
            print_json(&adapter.order_info(&args.order_id, &args.extra).await?)
        }
    }
}

/// Settings for `backend`: the YAML entry if present, otherwise the environment
fn exchange_config(cli: &Cli, backend: &str) -> anyhow::Result<ExchangeConfig> {
    let mut exchange = match &cli.config {
        Some(path) => {
            let mut app = config::load_config(path)
                .with_context(|| format!("loading {}", path.display()))?;
            app.apply_env_overrides();
            app.exchange(backend)
                .cloned()
                .unwrap_or_else(|| ExchangeConfig::from_env(backend))
        }
        None => ExchangeConfig::from_env(backend),
    };
    exchange.debug = exchange.debug || cli.debug;
    Ok(exchange)
}

fn resolve(registry: &Registry, cli: &Cli, backend: &str) -> anyhow::Result<Box<dyn ExchangeAdapter>> {
    let exchange = exchange_config(cli, backend)?;
    let adapter = registry.resolve(backend, exchange)?;
    Ok(adapter)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
