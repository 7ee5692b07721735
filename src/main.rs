use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::LevelFilter;
use pisofinder::api::{self, IdealistaClient};
use pisofinder::config::{Settings, DEFAULT_STORE_PATH};
use pisofinder::console;
use pisofinder::notify::TelegramNotifier;
use pisofinder::pipeline::{self, RunOptions, RunOutcome};
use pisofinder::Operation;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Pisofinder - Idealista listings tracker")]
struct Args {
    /// Path to the historical CSV store
    #[clap(short, long, default_value = DEFAULT_STORE_PATH)]
    output: PathBuf,

    /// Skip rental listings
    #[clap(long)]
    skip_rent: bool,

    /// Skip listings for sale
    #[clap(long)]
    skip_sale: bool,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    dotenv::dotenv().ok();

    console::banner("Pisofinder - Idealista listings tracker");

    let settings = Settings::from_env(&args.output);

    let operations: Vec<Operation> = Operation::ALL
        .into_iter()
        .filter(|op| match op {
            Operation::Rent => !args.skip_rent,
            Operation::Sale => !args.skip_sale,
        })
        .collect();
    if operations.is_empty() {
        console::warning("Both operations skipped, only the store will be rewritten");
    }

    let options = RunOptions {
        store_path: settings.store_path.clone(),
        operations,
        page: 1,
        location_label: settings.search.location_label.clone(),
    };

    let client = api::http_client().context("Failed to build HTTP client")?;
    let provider = IdealistaClient::new(
        client.clone(),
        settings.credentials.clone(),
        settings.search.clone(),
    );
    let notifier = TelegramNotifier::new(client, settings.telegram.clone());

    let report = pipeline::run(&provider, &notifier, &options, Local::now().naive_local());

    let notified = report.delivery.is_sent();
    match report.outcome {
        RunOutcome::Success(summary) => {
            println!("\n=== Summary ===");
            println!("New listings: {}", summary.new_rows);
            println!("Total listings in store: {}", summary.total_rows);
            println!("Saved to: {}", summary.store_path.display());
            println!("Telegram summary sent: {}", if notified { "yes" } else { "no" });
        }
        RunOutcome::Failure(_) => {
            println!("\nRun failed, store left untouched");
            println!("Telegram error report sent: {}", if notified { "yes" } else { "no" });
        }
    }

    Ok(())
}
