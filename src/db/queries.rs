use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::models::{ClientRecord, ExtractedIntent, MissingField, PendingRequest};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Pending requests ──

type PendingRow = (i64, String, String, String, String, String, String);

fn pending_from_row(row: PendingRow) -> anyhow::Result<PendingRequest> {
    let (chat_id, id, intent_json, client_json, missing_field, created_at, expires_at) = row;

    let partial_intent: ExtractedIntent = serde_json::from_str(&intent_json)?;
    let client: ClientRecord = serde_json::from_str(&client_json)?;
    let missing_field = MissingField::parse(&missing_field)
        .ok_or_else(|| anyhow::anyhow!("unknown missing field: {missing_field}"))?;

    Ok(PendingRequest {
        id,
        chat_id,
        partial_intent,
        client,
        missing_field,
        created_at: NaiveDateTime::parse_from_str(&created_at, TS_FORMAT)?,
        expires_at: NaiveDateTime::parse_from_str(&expires_at, TS_FORMAT)?,
    })
}

/// Live (not yet expired at `now`) pending request for a chat.
pub fn get_pending(
    conn: &Connection,
    chat_id: i64,
    now: &NaiveDateTime,
) -> anyhow::Result<Option<PendingRequest>> {
    let now = now.format(TS_FORMAT).to_string();
    let mut stmt = conn.prepare(
        "SELECT chat_id, id, partial_intent, client, missing_field, created_at, expires_at
         FROM pending_requests WHERE chat_id = ?1 AND expires_at > ?2",
    )?;

    let result: rusqlite::Result<PendingRow> = stmt.query_row(params![chat_id, now], |row| {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    });

    match result {
        Ok(row) => pending_from_row(row).map(Some),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Stores a pending request, replacing whatever the chat had before.
pub fn save_pending(conn: &Connection, pending: &PendingRequest) -> anyhow::Result<()> {
    let intent_json = serde_json::to_string(&pending.partial_intent)?;
    let client_json = serde_json::to_string(&pending.client)?;
    let created_at = pending.created_at.format(TS_FORMAT).to_string();
    let expires_at = pending.expires_at.format(TS_FORMAT).to_string();

    conn.execute(
        "INSERT INTO pending_requests (chat_id, id, partial_intent, client, missing_field, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(chat_id) DO UPDATE SET
           id = excluded.id,
           partial_intent = excluded.partial_intent,
           client = excluded.client,
           missing_field = excluded.missing_field,
           created_at = excluded.created_at,
           expires_at = excluded.expires_at",
        params![
            pending.chat_id,
            pending.id,
            intent_json,
            client_json,
            pending.missing_field.as_str(),
            created_at,
            expires_at,
        ],
    )?;
    Ok(())
}

/// Returns true if a row was removed.
pub fn delete_pending(conn: &Connection, chat_id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM pending_requests WHERE chat_id = ?1",
        params![chat_id],
    )?;
    Ok(count > 0)
}

pub fn list_pending(conn: &Connection, now: &NaiveDateTime) -> anyhow::Result<Vec<PendingRequest>> {
    let now = now.format(TS_FORMAT).to_string();
    let mut stmt = conn.prepare(
        "SELECT chat_id, id, partial_intent, client, missing_field, created_at, expires_at
         FROM pending_requests WHERE expires_at > ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt
        .query_map(params![now], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?
        .collect::<Result<Vec<PendingRow>, _>>()?;

    rows.into_iter().map(pending_from_row).collect()
}

pub fn expire_old_pending(conn: &Connection, now: &NaiveDateTime) -> anyhow::Result<usize> {
    let now = now.format(TS_FORMAT).to_string();
    let count = conn.execute(
        "DELETE FROM pending_requests WHERE expires_at <= ?1",
        params![now],
    )?;
    Ok(count)
}
