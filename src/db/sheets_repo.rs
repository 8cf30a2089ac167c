// src/db/sheets_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    db::{GoogleAuth, RecordSource},
    models::sheet::{RawRecord, ValueRange},
};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

// O "repositório" aqui é a própria planilha.
#[derive(Clone)]
pub struct SheetsRepository {
    client: reqwest::Client,
    auth: GoogleAuth,
    base_url: String,
    sheet_id: String,
    range: String,
}

impl SheetsRepository {
    pub fn new(client: reqwest::Client, auth: GoogleAuth, sheet_id: String, range: String) -> Self {
        Self {
            client,
            auth,
            base_url: SHEETS_API_BASE.to_string(),
            sheet_id,
            range,
        }
    }

    fn values_url(&self) -> Result<reqwest::Url, AppError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("URL base inválida '{}': {}", self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL base não aceita caminho: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.sheet_id.as_str(), "values", self.range.as_str()]);
        Ok(url)
    }

    // Busca a matriz crua de valores do intervalo configurado.
    pub async fn fetch_values(&self) -> Result<ValueRange, AppError> {
        let token = self.auth.access_token().await?;
        let url = self.values_url()?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamStatus { status: status.as_u16(), body });
        }

        Ok(response.json::<ValueRange>().await?)
    }
}

#[async_trait]
impl RecordSource for SheetsRepository {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, AppError> {
        let values = self.fetch_values().await?;
        let records = rows_to_records(values.values);
        tracing::debug!("📄 {} linhas lidas da planilha {}", records.len(), self.sheet_id);
        Ok(records)
    }
}

/// Primeira linha = cabeçalhos; cada linha seguinte vira um mapa cabeçalho -> valor.
/// A API omite células vazias no fim da linha, então essas colunas ficam ausentes.
pub fn rows_to_records(values: Vec<Vec<String>>) -> Vec<RawRecord> {
    let mut rows = values.into_iter();
    let Some(headers) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();

    rows.filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            let columns: HashMap<String, String> = headers
                .iter()
                .zip(row)
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), cell))
                .collect();
            RawRecord::from_columns(columns)
        })
        .collect()
}
