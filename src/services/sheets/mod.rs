pub mod google;

use async_trait::async_trait;

/// Read-only access to a spreadsheet-like store. Rows come back in sheet order,
/// cells rendered as strings; trailing empty cells may be absent.
#[async_trait]
pub trait TabularStore: Send + Sync {
    async fn read_range(&self, sheet: &str, range: &str) -> anyhow::Result<Vec<Vec<String>>>;
}
