use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fmt;

pub const OPERATION_COLUMN: &str = "operation";
pub const UPDATE_DATE_COLUMN: &str = "updateDate";
pub const PROPERTY_CODE_COLUMN: &str = "propertyCode";
pub const PRICE_COLUMN: &str = "price";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Rent,
    Sale,
}

impl Operation {
    /// Fetch order used by a full run.
    pub const ALL: [Operation; 2] = [Operation::Rent, Operation::Sale];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::Rent => "rent",
            Operation::Sale => "sale",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One listing as returned by the provider, stamped with the run's operation
/// and date.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub fields: Map<String, Value>,
    pub operation: Operation,
    pub update_date: NaiveDate,
}

impl Listing {
    pub fn property_code(&self) -> Option<String> {
        self.fields
            .get(PROPERTY_CODE_COLUMN)
            .map(render_cell)
            .filter(|code| !code.is_empty())
    }

    pub fn price(&self) -> Option<&Value> {
        self.fields.get(PRICE_COLUMN).filter(|v| !v.is_null())
    }

    /// Column names in store order: provider fields first, then the stamped
    /// columns unless the provider already sent fields with those names.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.fields.keys().cloned().collect();
        for stamped in [OPERATION_COLUMN, UPDATE_DATE_COLUMN] {
            if !self.fields.contains_key(stamped) {
                columns.push(stamped.to_string());
            }
        }
        columns
    }

    pub fn cell(&self, column: &str) -> Option<String> {
        match column {
            OPERATION_COLUMN => Some(self.operation.to_string()),
            UPDATE_DATE_COLUMN => Some(self.update_date.format(DATE_FORMAT).to_string()),
            _ => self.fields.get(column).map(render_cell),
        }
    }
}

/// Renders a JSON value the way it is written to a CSV cell.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(value: Value, operation: Operation) -> Listing {
        Listing {
            fields: value.as_object().cloned().unwrap(),
            operation,
            update_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn operation_wire_strings() {
        assert_eq!(Operation::Rent.to_string(), "rent");
        assert_eq!(Operation::Sale.as_str(), "sale");
        assert_eq!(Operation::ALL, [Operation::Rent, Operation::Sale]);
    }

    #[test]
    fn stamped_columns_follow_provider_fields() {
        let l = listing(json!({"propertyCode": "1", "price": 900.0}), Operation::Rent);
        assert_eq!(l.columns(), vec!["propertyCode", "price", "operation", "updateDate"]);
        assert_eq!(l.cell("updateDate").as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn stamped_operation_overrides_provider_field_in_place() {
        let l = listing(
            json!({"operation": "sale", "propertyCode": "7"}),
            Operation::Rent,
        );
        assert_eq!(l.columns(), vec!["operation", "propertyCode", "updateDate"]);
        assert_eq!(l.cell("operation").as_deref(), Some("rent"));
    }

    #[test]
    fn cells_render_json_types() {
        let l = listing(
            json!({
                "propertyCode": 105,
                "exterior": true,
                "floor": null,
                "detailedType": {"typology": "flat"}
            }),
            Operation::Sale,
        );
        assert_eq!(l.property_code().as_deref(), Some("105"));
        assert_eq!(l.cell("exterior").as_deref(), Some("true"));
        assert_eq!(l.cell("floor").as_deref(), Some(""));
        assert_eq!(l.cell("detailedType").as_deref(), Some(r#"{"typology":"flat"}"#));
        assert_eq!(l.cell("missing"), None);
    }
}
