use crate::errors::BillingError;
use crate::models::ClientRecord;
use crate::services::sheets::TabularStore;

pub const CLIENTS_SHEET: &str = "clients";
pub const CLIENTS_RANGE: &str = "A:C";
pub const SERVICES_SHEET: &str = "services";
pub const DEFAULT_SERVICE_CELL: &str = "A1";

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Exact, case-insensitive lookup of a client by the first column of the clients sheet.
/// The first row is a header. A miss is `Ok(None)`, not an error.
pub async fn resolve(
    store: &dyn TabularStore,
    name: &str,
) -> Result<Option<ClientRecord>, BillingError> {
    let rows = store
        .read_range(CLIENTS_SHEET, CLIENTS_RANGE)
        .await
        .map_err(BillingError::transport)?;

    let wanted = normalize(name);
    let found = rows
        .iter()
        .skip(1)
        .filter(|row| row.first().map(|cell| normalize(cell) == wanted).unwrap_or(false))
        .find_map(|row| ClientRecord::from_row(row));

    if found.is_none() {
        tracing::info!(client = %name, rows = rows.len().saturating_sub(1), "client not found");
    }
    Ok(found)
}

/// Service name used when a request does not mention one. Blank means none is configured.
pub async fn default_service(store: &dyn TabularStore) -> Result<Option<String>, BillingError> {
    let rows = store
        .read_range(SERVICES_SHEET, DEFAULT_SERVICE_CELL)
        .await
        .map_err(BillingError::transport)?;

    Ok(rows
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next())
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty()))
}
