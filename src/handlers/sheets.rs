// src/handlers/sheets.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::sheet::SheetPayload};

// GET /api/sheet
// Sempre lê a planilha na hora.
#[utoipa::path(
    get,
    path = "/api/sheet",
    tag = "Sheet",
    responses(
        (status = 200, description = "Linhas atuais da planilha", body = SheetPayload),
        (status = 502, description = "Falha na API do Google Sheets")
    )
)]
pub async fn get_sheet(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let data = app_state.source.fetch_records().await?;
    Ok((StatusCode::OK, Json(SheetPayload { data })))
}

// GET /api/sales
// Mesmo formato, mas servido do último snapshot do poller.
// Enquanto não existe snapshot, cai para a leitura direta.
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sheet",
    responses(
        (status = 200, description = "Linhas do último snapshot", body = SheetPayload),
        (status = 502, description = "Sem snapshot e a leitura direta falhou")
    )
)]
pub async fn get_sales(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let data = match app_state.snapshots.current().await {
        Some(snapshot) => snapshot.records.clone(),
        None => app_state.source.fetch_records().await?,
    };
    Ok((StatusCode::OK, Json(SheetPayload { data })))
}
