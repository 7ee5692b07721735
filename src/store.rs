use crate::error::{Result, TrackerError};
use crate::models::{Listing, OPERATION_COLUMN, PROPERTY_CODE_COLUMN, UPDATE_DATE_COLUMN};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub type Row = HashMap<String, String>;

/// The historical listings file held in memory: ordered header plus rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl HistoryTable {
    pub fn from_listings(listings: &[Listing]) -> Self {
        let mut table = Self::default();
        for listing in listings {
            let columns = listing.columns();
            for column in &columns {
                table.add_column(column);
            }
            let row = columns
                .into_iter()
                .filter_map(|column| listing.cell(&column).map(|value| (column, value)))
                .collect();
            table.rows.push(row);
        }
        table
    }

    /// Reads the whole file. Returns `None` when nothing exists at `path`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!("No store at {}, starting fresh", path.display());
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| TrackerError::store_io(path, e))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| TrackerError::store_io(path, e))?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| TrackerError::store_io(path, e))?;
            let row = columns
                .iter()
                .zip(record.iter())
                .map(|(column, value)| (column.clone(), value.to_string()))
                .collect();
            rows.push(row);
        }

        debug!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(Some(Self { columns, rows }))
    }

    /// Rewrites the whole file through a sibling temporary file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = temp_path(path);

        let written = (|| -> std::result::Result<(), csv::Error> {
            let mut writer = csv::Writer::from_path(&tmp)?;
            if self.columns.is_empty() {
                writer.write_record([OPERATION_COLUMN, UPDATE_DATE_COLUMN])?;
            } else {
                writer.write_record(&self.columns)?;
            }
            for row in &self.rows {
                writer.write_record(
                    self.columns
                        .iter()
                        .map(|column| row.get(column).map(String::as_str).unwrap_or("")),
                )?;
            }
            writer.flush()?;
            Ok(())
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(TrackerError::store_io(path, e));
        }

        fs::rename(&tmp, path).map_err(|e| TrackerError::store_io(path, e))
    }

    /// Appends `other` after the existing rows, extending the header with
    /// columns not seen before.
    pub fn append(&mut self, other: HistoryTable) {
        for column in &other.columns {
            self.add_column(column);
        }
        self.rows.extend(other.rows);
    }

    /// Keeps the first row for each (propertyCode, updateDate) pair and
    /// returns how many rows were dropped. Rows without a code are never
    /// treated as duplicates.
    pub fn dedup(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::new();
        self.rows.retain(|row| match dedup_key(row) {
            Some(key) => seen.insert(key),
            None => true,
        });
        before - self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).map(String::as_str).unwrap_or(""))
    }

    fn add_column(&mut self, column: &str) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }
}

fn dedup_key(row: &Row) -> Option<(String, String)> {
    let code = row.get(PROPERTY_CODE_COLUMN).filter(|c| !c.is_empty())?;
    let date = row.get(UPDATE_DATE_COLUMN).cloned().unwrap_or_default();
    Some((code.clone(), date))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Merges `batch` into the store at `path` and persists the result.
/// Rows already on disk win over same-day re-fetches.
pub fn update_store(path: &Path, batch: &[Listing]) -> Result<HistoryTable> {
    let incoming = HistoryTable::from_listings(batch);

    let mut combined = match HistoryTable::load(path)? {
        Some(mut existing) => {
            existing.append(incoming);
            existing
        }
        None => incoming,
    };

    let dropped = combined.dedup();
    if dropped > 0 {
        debug!("Dropped {} duplicate rows", dropped);
    }

    combined.save(path)?;
    info!("Saved {} rows to {}", combined.len(), path.display());

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::tempdir;

    fn listing(code: &str, price: f64, operation: Operation, day: u32) -> Listing {
        Listing {
            fields: json!({"propertyCode": code, "price": price})
                .as_object()
                .cloned()
                .unwrap(),
            operation,
            update_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        }
    }

    #[test]
    fn absent_store_loads_as_none() {
        let dir = tempdir().unwrap();
        assert_eq!(HistoryTable::load(&dir.path().join("missing.csv")).unwrap(), None);
    }

    #[test]
    fn first_run_creates_store_with_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let table = update_store(&path, &[listing("1", 800.0, Operation::Rent, 1)]).unwrap();

        assert_eq!(table.len(), 1);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "propertyCode,price,operation,updateDate\n1,800.0,rent,2024-01-01\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn empty_first_run_still_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let table = update_store(&path, &[]).unwrap();

        assert!(table.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "operation,updateDate\n");

        let table = update_store(&path, &[listing("1", 800.0, Operation::Rent, 1)]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns(), ["operation", "updateDate", "propertyCode", "price"]);
    }

    #[test]
    fn rows_without_code_are_all_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let mut first = listing("", 500.0, Operation::Rent, 1);
        first.fields.remove("propertyCode");
        let second = listing("", 650.0, Operation::Rent, 1);

        let table = update_store(&path, &[first, second]).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column_values("price").collect::<Vec<_>>(),
            vec!["500.0", "650.0"]
        );
    }

    #[test]
    fn existing_row_wins_over_same_day_refetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        update_store(&path, &[listing("1", 800.0, Operation::Rent, 1)]).unwrap();
        let table = update_store(&path, &[listing("1", 999.0, Operation::Rent, 1)]).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.column_values("price").collect::<Vec<_>>(), vec!["800.0"]);
    }

    #[test]
    fn same_code_on_new_day_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        update_store(&path, &[listing("1", 800.0, Operation::Rent, 1)]).unwrap();
        let table = update_store(&path, &[listing("1", 780.0, Operation::Rent, 2)]).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column_values("updateDate").collect::<Vec<_>>(),
            vec!["2024-01-01", "2024-01-02"]
        );
    }

    #[test]
    fn empty_batch_leaves_file_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        update_store(
            &path,
            &[
                listing("1", 800.0, Operation::Rent, 1),
                listing("2", 150000.0, Operation::Sale, 1),
            ],
        )
        .unwrap();
        let before = fs::read(&path).unwrap();

        update_store(&path, &[]).unwrap();

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn growth_is_bounded_by_batch_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        update_store(&path, &[listing("1", 1.0, Operation::Rent, 1)]).unwrap();
        let before = HistoryTable::load(&path).unwrap().unwrap().len();

        let batch = [
            listing("1", 2.0, Operation::Rent, 1),
            listing("2", 3.0, Operation::Rent, 1),
            listing("3", 4.0, Operation::Sale, 1),
        ];
        let after = update_store(&path, &batch).unwrap().len();

        assert!(after >= before);
        assert!(after <= before + batch.len());
        assert_eq!(after, 3);
    }

    #[test]
    fn new_columns_extend_header_and_leave_old_cells_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        update_store(&path, &[listing("1", 800.0, Operation::Rent, 1)]).unwrap();

        let mut extra = listing("2", 900.0, Operation::Rent, 1);
        extra.fields.insert("rooms".to_string(), json!(3));
        let table = update_store(&path, &[extra]).unwrap();

        assert_eq!(
            table.columns(),
            ["propertyCode", "price", "operation", "updateDate", "rooms"]
        );
        let reloaded = HistoryTable::load(&path).unwrap().unwrap();
        assert_eq!(reloaded.column_values("rooms").collect::<Vec<_>>(), vec!["", "3"]);
    }

    #[test]
    fn duplicates_inside_first_batch_are_collapsed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let table = update_store(
            &path,
            &[
                listing("1", 800.0, Operation::Rent, 1),
                listing("1", 810.0, Operation::Rent, 1),
            ],
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.column_values("price").collect::<Vec<_>>(), vec!["800.0"]);
    }
}
