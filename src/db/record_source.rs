// src/db/record_source.rs

use async_trait::async_trait;

use crate::{common::error::AppError, models::sheet::RawRecord};

// Qualquer coisa capaz de entregar as linhas cruas da planilha.
// O poller e os handlers só conhecem este contrato.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, AppError>;
}
