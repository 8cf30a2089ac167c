// src/models/dashboard.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    services::calendar::{first_day_of_month, month_label},
};

// Chave usada quando a data (ou mês/ano) não pôde ser interpretada.
pub const UNKNOWN: &str = "Unknown";

// 1. Agregado diário (uma entrada por data)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    pub date: String,  // YYYY-MM-DD ou "Unknown"
    pub month: String, // Nome completo do mês, ex: "April"
    pub year: String,  // "2024"
    pub sales_count: u32,
    pub revenue: f64,
    pub clients: Vec<String>, // Sem repetição dentro do mesmo dia
}

impl DailyAggregate {
    /// Rótulo "{month} {year}" usado pelo filtro de mês.
    pub fn month_label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }

    /// A data real do agregado; `None` para o balde "Unknown".
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

// 2. Total por vendedor
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonTotal {
    pub name: String,
    pub revenue: f64,
}

// Saída do normalizador
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSales {
    pub daily_aggregates: Vec<DailyAggregate>,
    pub person_totals: Vec<PersonTotal>,
    pub available_months: Vec<String>,
    pub available_years: Vec<String>,
}

// 3. Semana (intervalo inclusivo) dentro de um mês
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeekRange {
    #[schema(example = "2024-04-01")]
    pub start: NaiveDate,
    #[schema(example = "2024-04-07")]
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    Daily,
    Weekly,
    Monthly,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Sales,
    Revenue,
    Person,
}

// 4. Parâmetros de visualização escolhidos na tela.
// `None` em mês/ano significa "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub mode: TimeMode,
    pub selected_month: Option<String>,
    pub selected_week: Option<WeekRange>,
    pub selected_year: Option<String>,
    pub selected_chart: ChartKind,
}

impl FilterState {
    pub fn set_mode(&mut self, mode: TimeMode) {
        self.mode = mode;
    }

    /// Troca o mês selecionado. Qualquer semana escolhida antes é descartada,
    /// assim a semana nunca fica "velha" em relação ao mês.
    /// Rótulos válidos são reescritos na forma canônica ("april 2024" -> "April 2024").
    pub fn select_month(&mut self, month: Option<String>) {
        self.selected_month = month
            .filter(|m| !m.eq_ignore_ascii_case("all"))
            .map(|m| first_day_of_month(&m).map(month_label).unwrap_or(m));
        self.selected_week = None;
    }

    /// Só aceita uma semana quando existe um mês específico e a semana cabe nele.
    pub fn select_week(&mut self, week: WeekRange) -> Result<(), AppError> {
        let Some(month) = self.selected_month.as_deref() else {
            return Err(AppError::InvalidFilter(
                "Selecione um mês antes de escolher a semana.".to_string(),
            ));
        };

        if week.start > week.end || month_label(week.start) != month || month_label(week.end) != month {
            return Err(AppError::InvalidFilter(format!(
                "A semana {} a {} não pertence a {}.",
                week.start, week.end, month
            )));
        }

        self.selected_week = Some(week);
        Ok(())
    }

    pub fn set_year(&mut self, year: Option<String>) {
        self.selected_year = year.filter(|y| !y.eq_ignore_ascii_case("all"));
    }

    pub fn set_chart(&mut self, chart: ChartKind) {
        self.selected_chart = chart;
    }
}

// --- Requisição ---

// GET /api/dashboard?mode=weekly&month=April%202024&weekStart=2024-04-01&weekEnd=2024-04-07
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    #[serde(default)]
    pub mode: TimeMode,

    #[validate(length(min = 1, max = 32, message = "Mês inválido."))]
    #[param(example = "April 2024")]
    pub month: Option<String>,

    pub week_start: Option<NaiveDate>,
    pub week_end: Option<NaiveDate>,

    #[validate(custom(function = "validate_year", message = "Ano deve ser 'all' ou YYYY."))]
    #[param(example = "2024")]
    pub year: Option<String>,

    #[serde(default)]
    pub chart: ChartKind,
}

fn validate_year(year: &str) -> Result<(), ValidationError> {
    let is_year = year.len() == 4 && year.chars().all(|c| c.is_ascii_digit());
    if is_year || year.eq_ignore_ascii_case("all") {
        Ok(())
    } else {
        Err(ValidationError::new("year"))
    }
}

impl DashboardQuery {
    /// Aplica os parâmetros na mesma ordem da tela: mês antes da semana.
    pub fn into_filter(self) -> Result<FilterState, AppError> {
        let mut filter = FilterState::default();
        filter.set_mode(self.mode);
        filter.select_month(self.month);

        match (self.week_start, self.week_end) {
            (Some(start), Some(end)) => filter.select_week(WeekRange { start, end })?,
            (None, None) => {}
            _ => {
                return Err(AppError::InvalidFilter(
                    "weekStart e weekEnd devem ser enviados juntos.".to_string(),
                ))
            }
        }

        filter.set_year(self.year);
        filter.set_chart(self.chart);
        Ok(filter)
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeksQuery {
    #[validate(length(min = 1, max = 32, message = "Mês inválido."))]
    #[param(example = "April 2024")]
    pub month: String,
}

// --- Visões derivadas ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_sales: u32,
    pub total_revenue: f64,
    // Soma por dia, não é contagem global de clientes distintos.
    pub total_clients: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesPerDayEntry {
    pub date: String,
    pub sales: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueOverTimeEntry {
    pub month: String, // "April 2024"
    pub revenue: f64,
}

// A série exigida pelo gráfico selecionado.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", content = "points", rename_all = "lowercase")]
pub enum ChartSeries {
    Sales(Vec<SalesPerDayEntry>),
    Revenue(Vec<RevenueOverTimeEntry>),
    Person(Vec<PersonTotal>),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub filter: FilterState,
    pub summary: SummaryStats,
    pub chart: ChartSeries,
    pub available_months: Vec<String>,
    pub available_years: Vec<String>,
    pub week_ranges: Vec<WeekRange>,
    pub fetched_at: Option<DateTime<Utc>>,
}
