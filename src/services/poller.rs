// src/services/poller.rs

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{watch, RwLock},
    task::JoinHandle,
    time::{Interval, MissedTickBehavior},
};

use crate::{
    common::error::AppError,
    db::RecordSource,
    models::{dashboard::NormalizedSales, sheet::RawRecord},
    services::normalizer::normalize,
};

// O resultado de uma leitura bem-sucedida da planilha.
#[derive(Debug, Clone)]
pub struct SalesSnapshot {
    pub records: Vec<RawRecord>,
    pub sales: NormalizedSales,
    pub fetched_at: DateTime<Utc>,
}

impl SalesSnapshot {
    pub fn from_records(records: Vec<RawRecord>, fetched_at: DateTime<Utc>) -> Self {
        let sales = normalize(&records);
        Self { records, sales, fetched_at }
    }
}

/// Guarda o último snapshot. A troca é atômica: leitores veem o antigo ou o novo, inteiro.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Option<Arc<SalesSnapshot>>>>,
}

impl SnapshotStore {
    pub async fn current(&self) -> Option<Arc<SalesSnapshot>> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, snapshot: SalesSnapshot) {
        *self.inner.write().await = Some(Arc::new(snapshot));
    }
}

// Tarefa periódica que busca a planilha e substitui o snapshot.
pub struct Poller {
    source: Arc<dyn RecordSource>,
    store: SnapshotStore,
    interval: Duration,
}

impl Poller {
    pub fn new(source: Arc<dyn RecordSource>, store: SnapshotStore, interval: Duration) -> Self {
        Self { source, store, interval }
    }

    /// Uma rodada de busca. Em caso de erro o snapshot anterior continua valendo.
    pub async fn refresh_once(&self) -> Result<usize, AppError> {
        let records = self.source.fetch_records().await?;
        let count = records.len();
        self.store.replace(SalesSnapshot::from_records(records, Utc::now())).await;
        Ok(count)
    }

    /// Roda até o canal de shutdown receber `true` (ou ser fechado).
    /// Uma busca em andamento é abandonada assim que o shutdown chega.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut healthy = false;

            tracing::info!("⏱️ Atualização da planilha a cada {:?}", self.interval);

            loop {
                tokio::select! {
                    _ = shutdown_requested(&mut shutdown) => {
                        tracing::info!("🛑 Poller encerrado");
                        break;
                    }
                    _ = self.tick_and_refresh(&mut ticker, &mut healthy) => {}
                }
            }
        })
    }

    async fn tick_and_refresh(&self, ticker: &mut Interval, healthy: &mut bool) {
        ticker.tick().await;
        match self.refresh_once().await {
            Ok(count) if !*healthy => {
                *healthy = true;
                tracing::info!("✅ Dados da planilha carregados ({} linhas)", count);
            }
            Ok(count) => tracing::debug!("Snapshot atualizado ({} linhas)", count),
            Err(e) => {
                *healthy = false;
                tracing::warn!("⚠️ Falha ao atualizar a planilha, mantendo dados anteriores: {}", e);
            }
        }
    }
}

// Resolve quando o shutdown foi pedido ou o emissor sumiu.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
