use crate::auth::AccessToken;
use crate::config::{SearchParams, DEFAULT_STORE_PATH};
use crate::console;
use crate::error::{Result, TrackerError};
use crate::models::{Listing, Operation};
use crate::normalize;
use crate::notify::{Delivery, Notifier};
use crate::report::{self, RunSummary};
use crate::store;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use serde_json::Value;
use std::path::PathBuf;

/// A listings API the pipeline can pull from.
pub trait ListingsProvider {
    fn name(&self) -> &str;
    fn authenticate(&self) -> Result<AccessToken>;
    fn search(&self, token: &AccessToken, operation: Operation, page: u32) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub store_path: PathBuf,
    pub operations: Vec<Operation>,
    /// Only this one page is requested per operation.
    pub page: u32,
    pub location_label: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            operations: Operation::ALL.to_vec(),
            page: 1,
            location_label: SearchParams::default().location_label,
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Success(RunSummary),
    Failure(TrackerError),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub delivery: Delivery,
}

pub fn fetch_operation<P: ListingsProvider>(
    provider: &P,
    token: &AccessToken,
    operation: Operation,
    page: u32,
    today: NaiveDate,
) -> Result<Vec<Listing>> {
    console::step(&format!("Querying {} listings on {}...", operation, provider.name()));

    let response = provider.search(token, operation, page)?;
    let listings = normalize::results_to_listings(&response, operation, today)?;

    if listings.is_empty() {
        debug!("Empty {} for {}", normalize::ELEMENT_LIST, operation);
        console::warning(&format!("No results found for {}", operation));
    } else {
        console::detail(&format!(
            "Page {}: {} listings found for {}",
            page,
            listings.len(),
            operation
        ));
    }

    Ok(listings)
}

/// Authenticates, fetches every requested operation, then merges the batch
/// into the store. Nothing is written unless all fetches succeed.
pub fn run_update<P: ListingsProvider>(
    provider: &P,
    options: &RunOptions,
    now: NaiveDateTime,
) -> Result<RunSummary> {
    console::step("Requesting access token...");
    let token = provider.authenticate()?;

    let today = now.date();
    let mut batch = Vec::new();
    for &operation in &options.operations {
        batch.extend(fetch_operation(provider, &token, operation, options.page, today)?);
    }
    console::detail(&format!("New listings fetched: {}", batch.len()));

    let table = store::update_store(&options.store_path, &batch)?;
    console::success(&format!("Store updated: {}", options.store_path.display()));
    console::detail(&format!("Accumulated total: {}", table.len()));

    Ok(RunSummary::from_batch(
        &batch,
        table.len(),
        &options.store_path,
        now,
    ))
}

/// Runs one update and reports the outcome through `notifier`. Never fails:
/// errors end up in the returned outcome and the error notification.
pub fn run<P: ListingsProvider, N: Notifier>(
    provider: &P,
    notifier: &N,
    options: &RunOptions,
    now: NaiveDateTime,
) -> RunReport {
    let (outcome, message) = match run_update(provider, options, now) {
        Ok(summary) => {
            info!(
                "Run finished: {} new rows, {} total",
                summary.new_rows, summary.total_rows
            );
            let message = summary.to_message(&options.location_label);
            (RunOutcome::Success(summary), message)
        }
        Err(e) => {
            debug!("Run failed: {:?}", e);
            console::failure(&format!("Error: {}", e));
            let message = report::error_message(&e);
            (RunOutcome::Failure(e), message)
        }
    };

    console::step("Sending notification to Telegram...");
    let delivery = notifier.notify(&message);
    match delivery {
        Delivery::Sent => console::success("Telegram message sent"),
        Delivery::Skipped => console::warning("Telegram not configured, message not sent"),
        Delivery::Failed => console::failure("Could not send Telegram message"),
    }

    RunReport { outcome, delivery }
}
