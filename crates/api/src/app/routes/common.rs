use axum::http::StatusCode;

use storefront_core::{ProductId, SizeLabel};

use crate::app::errors;

/// Parse the `/:product/:size` path pair.
pub fn parse_key(product: &str, size: &str) -> Result<(ProductId, SizeLabel), axum::response::Response> {
    let product: ProductId = product
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))?;
    let size: SizeLabel = size
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid size label"))?;
    Ok((product, size))
}

/// Parse a uuid-backed id from a path segment.
pub fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
