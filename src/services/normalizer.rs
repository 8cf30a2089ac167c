// src/services/normalizer.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{
    dashboard::{DailyAggregate, NormalizedSales, PersonTotal, UNKNOWN},
    sheet::RawRecord,
};

// Formatos de data aceitos na coluna "Date", em ordem de tentativa.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Interpreta a data livre da planilha. `None` quando nenhum formato serve.
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Coerção numérica da receita: "$1,250.50" -> 1250.5; qualquer outra coisa -> 0.
pub fn parse_revenue(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// Um campo só conta como presente se tiver algo além de espaços.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Converte as linhas cruas em agregados diários, totais por vendedor e os
/// meses/anos disponíveis. Nunca falha: linhas ruins são descartadas ou
/// caem no balde "Unknown".
pub fn normalize(records: &[RawRecord]) -> NormalizedSales {
    // BTreeMap já entrega as chaves em ordem lexicográfica (correta para YYYY-MM-DD).
    let mut by_date: BTreeMap<String, DailyAggregate> = BTreeMap::new();
    let mut person_index: HashMap<String, usize> = HashMap::new();
    let mut person_totals: Vec<PersonTotal> = Vec::new();

    for record in records {
        let (Some(raw_date), Some(raw_revenue)) = (present(&record.date), present(&record.revenue)) else {
            continue;
        };

        let revenue = parse_revenue(raw_revenue);
        let parsed = parse_sheet_date(raw_date);

        let key = parsed
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let aggregate = by_date.entry(key.clone()).or_insert_with(|| DailyAggregate {
            date: key,
            month: parsed
                .map(|d| d.format("%B").to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            year: parsed
                .map(|d| d.format("%Y").to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            sales_count: 0,
            revenue: 0.0,
            clients: Vec::new(),
        });

        aggregate.sales_count += 1;
        aggregate.revenue += revenue;

        if let Some(client) = present(&record.client) {
            if !aggregate.clients.iter().any(|c| c == client) {
                aggregate.clients.push(client.to_string());
            }
        }

        let name = present(&record.sales_person).unwrap_or(UNKNOWN);
        match person_index.get(name) {
            Some(&idx) => person_totals[idx].revenue += revenue,
            None => {
                person_index.insert(name.to_string(), person_totals.len());
                person_totals.push(PersonTotal { name: name.to_string(), revenue });
            }
        }
    }

    let daily_aggregates: Vec<DailyAggregate> = by_date.into_values().collect();

    let mut available_months: Vec<String> = Vec::new();
    let mut available_years: Vec<String> = Vec::new();
    for aggregate in &daily_aggregates {
        let label = aggregate.month_label();
        if !available_months.contains(&label) {
            available_months.push(label);
        }
        if !available_years.contains(&aggregate.year) {
            available_years.push(aggregate.year.clone());
        }
    }

    NormalizedSales {
        daily_aggregates,
        person_totals,
        available_months,
        available_years,
    }
}
