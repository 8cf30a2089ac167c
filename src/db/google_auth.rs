// src/db/google_auth.rs

use std::{path::Path, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::common::error::AppError;

const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

// Margem antes do vencimento em que o token já é renovado.
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Os campos da chave JSON da conta de serviço que realmente usamos.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path)?;
        let key: ServiceAccountKey = serde_json::from_str(&contents)?;
        Ok(key)
    }

    /// Variáveis de ambiente costumam trazer a chave com "\n" escapado.
    pub fn from_parts(client_email: String, private_key: &str) -> Self {
        Self {
            client_email,
            private_key: private_key.replace("\\n", "\n"),
            token_uri: default_token_uri(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
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

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

// Fluxo OAuth2 "JWT bearer" da conta de serviço, com cache do access token.
#[derive(Clone)]
pub struct GoogleAuth {
    client: reqwest::Client,
    key: Arc<ServiceAccountKey>,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl GoogleAuth {
    pub fn new(client: reqwest::Client, key: ServiceAccountKey) -> Self {
        Self {
            client,
            key: Arc::new(key),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub async fn access_token(&self) -> Result<String, AppError> {
        // O lock fica preso durante a troca para evitar duas renovações simultâneas.
        let mut cache = self.cache.lock().await;
        let now = Utc::now();

        if let Some(token) = cache.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let assertion = self.sign_assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamStatus { status: status.as_u16(), body });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!("🔑 Novo access token obtido (expira em {}s)", token.expires_in);

        let value = token.access_token.clone();
        *cache = Some(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(value)
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SHEETS_READONLY_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AppError::CredentialsError(format!("chave privada inválida: {}", e)))?;

        Ok(encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?)
    }
}
