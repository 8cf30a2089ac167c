// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    db::{GoogleAuth, RecordSource, ServiceAccountKey, SheetsRepository},
    services::{
        calendar::WeekConvention,
        dashboard_service::DashboardService,
        poller::{Poller, SnapshotStore},
    },
};

const DEFAULT_RANGE: &str = "Sheet1!A1:F";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_REFRESH_MS: u64 = 1000;
const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} deve ser definida")]
    Missing(&'static str),

    #[error("valor inválido para {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// De onde vem a chave da conta de serviço.
#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    KeyFile(PathBuf),
    Inline { client_email: String, private_key: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sheet_id: String,
    pub sheet_range: String,
    pub credentials: Credentials,
    pub bind_addr: String,
    pub refresh_interval: Duration,
    pub week_convention: WeekConvention,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Lê a configuração através de uma função de busca (o ambiente, em produção).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let sheet_id = get("SHEET_ID").ok_or(ConfigError::Missing("SHEET_ID"))?;

        let credentials = match (
            get("GOOGLE_APPLICATION_CREDENTIALS"),
            get("GOOGLE_CLIENT_EMAIL"),
            get("GOOGLE_PRIVATE_KEY"),
        ) {
            (Some(path), _, _) => Credentials::KeyFile(PathBuf::from(path)),
            (None, Some(client_email), Some(private_key)) => Credentials::Inline { client_email, private_key },
            _ => return Err(ConfigError::Missing("GOOGLE_APPLICATION_CREDENTIALS (ou GOOGLE_CLIENT_EMAIL + GOOGLE_PRIVATE_KEY)")),
        };

        let refresh_interval = match get("REFRESH_INTERVAL_MS") {
            Some(raw) => {
                let millis = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    key: "REFRESH_INTERVAL_MS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                if millis == 0 {
                    return Err(ConfigError::Invalid {
                        key: "REFRESH_INTERVAL_MS",
                        value: raw,
                        reason: "deve ser maior que zero".to_string(),
                    });
                }
                Duration::from_millis(millis)
            }
            None => Duration::from_millis(DEFAULT_REFRESH_MS),
        };

        let week_convention = match get("WEEK_CONVENTION") {
            Some(raw) => raw.parse::<WeekConvention>().map_err(|reason| ConfigError::Invalid {
                key: "WEEK_CONVENTION",
                value: raw.clone(),
                reason,
            })?,
            None => WeekConvention::default(),
        };

        Ok(Self {
            sheet_id,
            sheet_range: get("SHEET_RANGE").unwrap_or_else(|| DEFAULT_RANGE.to_string()),
            credentials,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            refresh_interval,
            week_convention,
            static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn RecordSource>,
    pub snapshots: SnapshotStore,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::from_env()?;
        tracing::info!(
            "📊 Planilha {} ({}), semanas: {}",
            config.sheet_id,
            config.sheet_range,
            config.week_convention
        );

        let key = match &config.credentials {
            Credentials::KeyFile(path) => ServiceAccountKey::from_file(path)
                .map_err(|e| anyhow::anyhow!("Falha ao ler {}: {}", path.display(), e))?,
            Credentials::Inline { client_email, private_key } => {
                ServiceAccountKey::from_parts(client_email.clone(), private_key)
            }
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        // --- Monta o gráfico de dependências ---
        let auth = GoogleAuth::new(client.clone(), key);
        tracing::info!("🔐 Conta de serviço: {}", auth.client_email());

        let repo = SheetsRepository::new(client, auth, config.sheet_id.clone(), config.sheet_range.clone());

        Ok(Self::with_source(config, Arc::new(repo)))
    }

    pub fn with_source(config: Config, source: Arc<dyn RecordSource>) -> Self {
        let snapshots = SnapshotStore::default();
        let dashboard_service = DashboardService::new(snapshots.clone(), config.week_convention);

        Self {
            config: Arc::new(config),
            source,
            snapshots,
            dashboard_service,
        }
    }

    pub fn poller(&self) -> Poller {
        Poller::new(self.source.clone(), self.snapshots.clone(), self.config.refresh_interval)
    }
}
