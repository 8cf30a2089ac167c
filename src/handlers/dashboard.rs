// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::{DashboardQuery, DashboardView, WeekRange, WeeksQuery},
};

// GET /api/dashboard
// Estatísticas + série do gráfico escolhido, já filtradas.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Visão filtrada do painel", body = DashboardView),
        (status = 400, description = "Filtro inválido (semana fora do mês, ano malformado)")
    )
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;
    let filter = query.into_filter()?;

    let today = chrono::Local::now().date_naive();
    let view = app_state.dashboard_service.get_view(&filter, today).await;

    Ok((StatusCode::OK, Json(view)))
}

// GET /api/weeks?month=April%202024
// Alimenta o seletor de semanas.
#[utoipa::path(
    get,
    path = "/api/weeks",
    tag = "Dashboard",
    params(WeeksQuery),
    responses(
        (status = 200, description = "Semanas do mês, em ordem", body = Vec<WeekRange>),
        (status = 400, description = "Mês não reconhecido")
    )
)]
pub async fn get_weeks(
    State(app_state): State<AppState>,
    Query(query): Query<WeeksQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let weeks = app_state.dashboard_service.get_week_ranges(&query.month);
    if weeks.is_empty() {
        return Err(AppError::InvalidFilter(format!(
            "Mês '{}' não reconhecido. Use o formato 'April 2024'.",
            query.month
        )));
    }

    Ok((StatusCode::OK, Json(weeks)))
}
