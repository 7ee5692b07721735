use crate::models::{Listing, Operation};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragePrices {
    pub rent: f64,
    pub sale: f64,
}

/// Outcome of a successful run, rendered into the Telegram summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub finished_at: NaiveDateTime,
    pub new_rows: usize,
    pub rent_count: usize,
    pub sale_count: usize,
    pub total_rows: usize,
    pub average_prices: Option<AveragePrices>,
    pub store_path: PathBuf,
}

impl RunSummary {
    pub fn from_batch(
        batch: &[Listing],
        total_rows: usize,
        store_path: &Path,
        finished_at: NaiveDateTime,
    ) -> Self {
        Self {
            finished_at,
            new_rows: batch.len(),
            rent_count: count(batch, Operation::Rent),
            sale_count: count(batch, Operation::Sale),
            total_rows,
            average_prices: average_prices(batch),
            store_path: store_path.to_path_buf(),
        }
    }

    pub fn to_message(&self, location_label: &str) -> String {
        let price_info = self
            .average_prices
            .map(|p| {
                format!(
                    "\n💰 <b>Average prices:</b>\n   • Rent: {:.0}€\n   • Sale: {:.0}€",
                    p.rent, p.sale
                )
            })
            .unwrap_or_default();

        format!(
            "🏠 <b>Idealista update completed</b>\n\
             ⏰ <b>Date:</b> {}\n\
             📍 <b>Location:</b> {}\n\
             \n\
             📊 <b>Results:</b>\n   \
             • New listings: {}\n   \
             • Rent: {}\n   \
             • Sale: {}\n   \
             • Accumulated total: {}{}\n\
             \n\
             ✅ <b>Status:</b> CSV file updated\n\
             📁 <b>Path:</b> {}",
            self.finished_at.format("%Y-%m-%d %H:%M:%S"),
            escape_html(location_label),
            self.new_rows,
            self.rent_count,
            self.sale_count,
            self.total_rows,
            price_info,
            escape_html(&self.store_path.display().to_string()),
        )
    }
}

fn count(batch: &[Listing], operation: Operation) -> usize {
    batch.iter().filter(|l| l.operation == operation).count()
}

/// Mean price per operation, or `None` when no listing carries a price or a
/// price is not numeric. An operation without rows averages to zero.
pub fn average_prices(batch: &[Listing]) -> Option<AveragePrices> {
    if !batch.iter().any(|l| l.fields.contains_key(crate::models::PRICE_COLUMN)) {
        return None;
    }

    let mean = |operation: Operation| -> Option<f64> {
        let mut sum = 0.0;
        let mut n = 0usize;
        for listing in batch.iter().filter(|l| l.operation == operation) {
            if let Some(price) = listing.price() {
                sum += numeric(price)?;
                n += 1;
            }
        }
        Some(if n == 0 { 0.0 } else { sum / n as f64 })
    };

    Some(AveragePrices {
        rent: mean(Operation::Rent)?,
        sale: mean(Operation::Sale)?,
    })
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

pub fn error_message(error: &dyn fmt::Display) -> String {
    format!(
        "❌ <b>Error during Idealista update:</b>\n\n{}",
        escape_html(&error.to_string())
    )
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    text.chars()
        .fold(String::with_capacity(text.len()), |mut out, c| {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(c),
            }
            out
        })
}
