use crate::config::SearchParams;
use crate::models::Operation;
use urlencoding::encode;

/// Builds the search URL for one results page of an operation.
pub fn search_url(params: &SearchParams, operation: Operation, page: u32) -> String {
    format!(
        "{}{}/search?operation={}&maxItems={}&order={}&center={}&distance={}&propertyType={}&sort={}&numPage={}&language={}",
        params.base_url,
        encode(&params.country),
        operation,
        params.max_items,
        encode(&params.order),
        encode(&params.center_param()),
        params.distance_m,
        encode(&params.property_type),
        encode(&params.sort),
        page,
        encode(&params.language),
    )
}
