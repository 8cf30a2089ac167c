// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Sheet ---
        handlers::sheets::get_sheet,
        handlers::sheets::get_sales,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::get_weeks,
    ),
    components(
        schemas(
            // --- Sheet ---
            models::sheet::RawRecord,
            models::sheet::SheetPayload,

            // --- Dashboard ---
            models::dashboard::TimeMode,
            models::dashboard::ChartKind,
            models::dashboard::WeekRange,
            models::dashboard::FilterState,
            models::dashboard::SummaryStats,
            models::dashboard::SalesPerDayEntry,
            models::dashboard::RevenueOverTimeEntry,
            models::dashboard::PersonTotal,
            models::dashboard::ChartSeries,
            models::dashboard::DashboardView,
        )
    ),
    tags(
        (name = "Sheet", description = "Linhas cruas da planilha"),
        (name = "Dashboard", description = "Indicadores e Gráficos de Vendas")
    )
)]
pub struct ApiDoc;
