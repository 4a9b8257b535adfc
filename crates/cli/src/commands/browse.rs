//! Navigation and catalog commands.

use serde_json::json;
use teamall_client::{ClientError, Storefront};

use crate::output;

/// Run the guard for `path` and print the committed location.
///
/// # Errors
///
/// Returns `ClientError::Navigation` if the path is not a known route.
pub fn navigate(shop: &Storefront, path: &str) -> Result<(), ClientError> {
    let location = shop.navigate(path)?;
    output::line(location.full_path());
    if let Some(name) = location.name {
        output::line(format_args!("route: {name}"));
    }
    if let Some(title) = location.meta.title {
        output::line(format_args!("title: {title}"));
    }
    for (key, value) in &location.params {
        output::line(format_args!("param {key} = {value}"));
    }
    Ok(())
}

/// Print the catalog, or search results for `keyword`.
///
/// # Errors
///
/// Any gateway failure, or if the payload cannot be printed.
pub async fn products(
    shop: &Storefront,
    keyword: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let envelope = match keyword {
        Some(keyword) => shop.api().products.search(keyword).await?,
        None => shop.api().products.list(&json!({ "page": 1 })).await?,
    };
    let data = envelope.data.unwrap_or_default();
    output::line(serde_json::to_string_pretty(&data)?);
    Ok(())
}
