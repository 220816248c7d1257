use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::TabularStore;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account key file that the token grant needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service account key {}", path.display()))?;
        serde_json::from_str(&raw).context("failed to parse service account key")
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

#[derive(Debug, Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    refresh_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Google Sheets v4 values reader authenticated as a service account.
pub struct GoogleSheetsStore {
    spreadsheet_id: String,
    key: ServiceAccountKey,
    token: Mutex<Option<CachedToken>>,
    client: reqwest::Client,
}

impl GoogleSheetsStore {
    pub fn new(spreadsheet_id: String, key: ServiceAccountKey) -> Self {
        Self {
            spreadsheet_id,
            key,
            token: Mutex::new(None),
            client: reqwest::Client::new(),
        }
    }

    async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.refresh_at > now {
                return Ok(token.value.clone());
            }
        }

        let claims = GrantClaims {
            iss: &self.key.client_email,
            scope: READONLY_SCOPE,
            aud: self.key.token_uri(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .context("invalid service account private key")?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .context("failed to sign token grant")?;

        let resp: TokenResponse = self
            .client
            .post(self.key.token_uri())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("failed to call Google token endpoint")?
            .error_for_status()
            .context("Google token endpoint returned error")?
            .json()
            .await
            .context("failed to parse Google token response")?;

        // Refresh a minute early so a token never expires mid-request.
        let lifetime = Duration::seconds((resp.expires_in - 60).max(0));
        *cached = Some(CachedToken {
            value: resp.access_token.clone(),
            refresh_at: now + lifetime,
        });
        tracing::debug!(expires_in = resp.expires_in, "obtained Google access token");

        Ok(resp.access_token)
    }

    fn values_url(&self, sheet: &str, range: &str) -> anyhow::Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(SHEETS_API).context("invalid Sheets API url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Sheets API url cannot have path segments"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{sheet}!{range}"));
        Ok(url)
    }
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl TabularStore for GoogleSheetsStore {
    async fn read_range(&self, sheet: &str, range: &str) -> anyhow::Result<Vec<Vec<String>>> {
        let token = self.access_token().await?;
        let url = self.values_url(sheet, range)?;

        let data: ValueRange = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("failed to call Google Sheets API")?
            .error_for_status()
            .context("Google Sheets API returned error")?
            .json()
            .await
            .context("failed to parse Google Sheets response")?;

        Ok(data
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }
}
