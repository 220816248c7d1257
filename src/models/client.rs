use serde::{Deserialize, Serialize};

/// A row of the clients sheet. `fields[0]` is the client name as written in the sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientRecord {
    pub name: String,
    pub fields: Vec<String>,
}

impl ClientRecord {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let name = row.first()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            fields: row.to_vec(),
        })
    }
}
