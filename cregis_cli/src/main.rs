//! Operator CLI for poking a Cregis deployment.
//!
//! Reads the same `CPG_*` environment variables as the gateway server, so a `.env` next to the server configuration
//! works here too.

use clap::{Parser, Subcommand};
use log::*;

use cpg_common::Amount;
use cregis_tools::{CheckoutRequest, CregisApi, CregisConfig};

#[derive(Parser)]
#[command(name = "cregis_cli", about = "Create and inspect Cregis checkout orders")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a checkout order and print the processor's reference for it
    Create {
        /// The merchant order id to create the checkout for
        order_id: String,
        /// The order amount, e.g. 100.00
        amount: Amount,
        /// The order currency, e.g. USD
        currency: String,
        #[arg(long, default_value = "cli")]
        payer_id: String,
        #[arg(long, default_value = "")]
        payer_name: String,
        #[arg(long, default_value = "")]
        payer_email: String,
        /// Minutes until the checkout expires
        #[arg(long, default_value_t = 60)]
        valid_time: u32,
        #[arg(long, default_value = "https://example.com/webhook/cregis")]
        callback_url: String,
        #[arg(long, default_value = "https://example.com/thanks")]
        success_url: String,
        #[arg(long, default_value = "https://example.com/checkout")]
        cancel_url: String,
    },
    /// Query an existing checkout order by processor id and/or merchant order id
    Query {
        #[arg(long)]
        cregis_id: Option<String>,
        #[arg(long)]
        order_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();
    let config = CregisConfig::new_from_env_or_default();
    let api = match CregisApi::new(config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Could not create API client: {e}");
            std::process::exit(1);
        },
    };
    match run(cli.command, &api).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            std::process::exit(1);
        },
    }
}

async fn run(command: Command, api: &CregisApi) -> Result<String, cregis_tools::CregisApiError> {
    match command {
        Command::Create {
            order_id,
            amount,
            currency,
            payer_id,
            payer_name,
            payer_email,
            valid_time,
            callback_url,
            success_url,
            cancel_url,
        } => {
            let request = CheckoutRequest {
                amount,
                currency,
                payer_id,
                payer_name,
                payer_email,
                valid_time,
                callback_url,
                success_url,
                cancel_url,
                ..Default::default()
            };
            let reference = api.create_payment(&order_id, &request).await?;
            Ok(serde_json::to_string_pretty(&reference).unwrap_or_default())
        },
        Command::Query { cregis_id, order_id } => {
            let data = api.query_payment(cregis_id.as_deref(), order_id.as_deref()).await?;
            Ok(serde_json::to_string_pretty(&data).unwrap_or_default())
        },
    }
}
