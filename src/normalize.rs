use crate::error::{Result, TrackerError};
use crate::models::{Listing, Operation};
use chrono::NaiveDate;
use serde_json::Value;

pub const ELEMENT_LIST: &str = "elementList";

/// Turns a search response into listing rows stamped with the operation and
/// the run date. A missing, null or empty `elementList` means no results.
pub fn results_to_listings(
    response: &Value,
    operation: Operation,
    update_date: NaiveDate,
) -> Result<Vec<Listing>> {
    let object = response.as_object().ok_or_else(|| {
        TrackerError::MalformedResponse("search response is not a JSON object".to_string())
    })?;

    let elements = match object.get(ELEMENT_LIST) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(elements)) => elements,
        Some(_) => {
            return Err(TrackerError::MalformedResponse(format!(
                "{} is not an array",
                ELEMENT_LIST
            )))
        }
    };

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let fields = element.as_object().cloned().ok_or_else(|| {
                TrackerError::MalformedResponse(format!(
                    "{}[{}] is not an object",
                    ELEMENT_LIST, index
                ))
            })?;
            Ok(Listing {
                fields,
                operation,
                update_date,
            })
        })
        .collect()
}
