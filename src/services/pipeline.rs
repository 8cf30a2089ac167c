// src/services/pipeline.rs

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::{
    models::dashboard::{
        ChartKind, ChartSeries, DailyAggregate, DashboardView, FilterState, NormalizedSales,
        RevenueOverTimeEntry, SalesPerDayEntry, SummaryStats, TimeMode,
    },
    services::calendar::{self, WeekConvention},
};

const WEEK_WINDOW_DAYS: u64 = 7;
const MONTH_WINDOW_DAYS: u64 = 30;

// Janela de exatamente `days` datas terminando hoje: [today - (days - 1), today].
// O balde "Unknown" nunca entra.
fn within_trailing_days(aggregate: &DailyAggregate, today: NaiveDate, days: u64) -> bool {
    let Some(date) = aggregate.parsed_date() else {
        return false;
    };
    let since = today
        .checked_sub_days(Days::new(days.saturating_sub(1)))
        .unwrap_or(NaiveDate::MIN);
    since <= date && date <= today
}

fn matches_mode(aggregate: &DailyAggregate, filter: &FilterState, today: NaiveDate) -> bool {
    match filter.mode {
        TimeMode::Daily => aggregate.parsed_date() == Some(today),
        TimeMode::Weekly => match (&filter.selected_month, &filter.selected_week) {
            (Some(_), Some(week)) => aggregate.parsed_date().is_some_and(|d| week.contains(d)),
            // Sem semana escolhida: últimos 7 dias, não o mês inteiro.
            _ => within_trailing_days(aggregate, today, WEEK_WINDOW_DAYS),
        },
        TimeMode::Monthly => within_trailing_days(aggregate, today, MONTH_WINDOW_DAYS),
        TimeMode::All => true,
    }
}

fn matches_month(aggregate: &DailyAggregate, filter: &FilterState) -> bool {
    match (&filter.selected_month, filter.mode) {
        // No modo semanal o intervalo da semana já implica o mês.
        (_, TimeMode::Weekly) | (None, _) => true,
        (Some(month), _) => aggregate.month_label() == *month,
    }
}

/// Aplica o filtro de modo e depois o de mês, preservando a ordem.
pub fn filter_aggregates(
    aggregates: &[DailyAggregate],
    filter: &FilterState,
    today: NaiveDate,
) -> Vec<DailyAggregate> {
    aggregates
        .iter()
        .filter(|a| matches_mode(a, filter, today))
        .filter(|a| matches_month(a, filter))
        .cloned()
        .collect()
}

pub fn summarize(aggregates: &[DailyAggregate]) -> SummaryStats {
    SummaryStats {
        total_sales: aggregates.iter().map(|a| a.sales_count).sum(),
        total_revenue: aggregates.iter().map(|a| a.revenue).sum(),
        total_clients: aggregates.iter().map(|a| a.clients.len()).sum(),
    }
}

pub fn sales_per_day(aggregates: &[DailyAggregate]) -> Vec<SalesPerDayEntry> {
    aggregates
        .iter()
        .map(|a| SalesPerDayEntry {
            date: a.date.clone(),
            sales: a.sales_count,
        })
        .collect()
}

/// Receita por "Month Year", opcionalmente restrita a um ano, em ordem de calendário.
pub fn revenue_over_time(aggregates: &[DailyAggregate], year: Option<&str>) -> Vec<RevenueOverTimeEntry> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for aggregate in aggregates {
        if year.is_some_and(|y| aggregate.year != y) {
            continue;
        }
        *totals.entry(aggregate.month_label()).or_insert(0.0) += aggregate.revenue;
    }

    let mut entries: Vec<RevenueOverTimeEntry> = totals
        .into_iter()
        .map(|(month, revenue)| RevenueOverTimeEntry { month, revenue })
        .collect();

    // Rótulos sem data válida vão para o fim.
    entries.sort_by(|a, b| {
        let key_a = calendar::month_sort_key(&a.month);
        let key_b = calendar::month_sort_key(&b.month);
        match (key_a, key_b) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.month.cmp(&b.month),
        }
    });
    entries
}

/// Monta tudo o que a tela precisa para o filtro atual. Função pura: não guarda estado.
pub fn build_view(
    sales: &NormalizedSales,
    fetched_at: Option<DateTime<Utc>>,
    filter: &FilterState,
    today: NaiveDate,
    convention: WeekConvention,
) -> DashboardView {
    let filtered = filter_aggregates(&sales.daily_aggregates, filter, today);

    let chart = match filter.selected_chart {
        ChartKind::Sales => ChartSeries::Sales(sales_per_day(&filtered)),
        ChartKind::Revenue => ChartSeries::Revenue(revenue_over_time(&filtered, filter.selected_year.as_deref())),
        // Sempre o histórico completo, ignora o filtro de tempo.
        ChartKind::Person => ChartSeries::Person(sales.person_totals.clone()),
    };

    let week_ranges = filter
        .selected_month
        .as_deref()
        .map(|month| calendar::week_ranges(month, convention))
        .unwrap_or_default();

    DashboardView {
        filter: filter.clone(),
        summary: summarize(&filtered),
        chart,
        available_months: sales.available_months.clone(),
        available_years: sales.available_years.clone(),
        week_ranges,
        fetched_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{dashboard::WeekRange, sheet::RawRecord},
        services::normalizer::normalize,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date: &str, revenue: &str, client: &str) -> RawRecord {
        RawRecord {
            date: Some(date.to_string()),
            revenue: Some(revenue.to_string()),
            client: Some(client.to_string()),
            ..Default::default()
        }
    }

    fn april_sales() -> NormalizedSales {
        normalize(&[
            row("2024-03-20", "40", "Z"),
            row("2024-04-01", "100", "A"),
            row("2024-04-01", "50", "A"),
            row("2024-04-02", "75", "B"),
            row("2024-04-10", "10", "A"),
            row("2024-04-15", "20", "C"),
            row("bad date", "5", "D"),
        ])
    }

    fn filter_with(mode: TimeMode, month: Option<&str>) -> FilterState {
        let mut filter = FilterState::default();
        filter.set_mode(mode);
        filter.select_month(month.map(str::to_string));
        filter
    }

    #[test]
    fn scenario_totals_for_three_rows() {
        let sales = normalize(&[
            row("2024-04-01", "100", "A"),
            row("2024-04-01", "50", "A"),
            row("2024-04-02", "75", "B"),
        ]);
        let filtered = filter_aggregates(&sales.daily_aggregates, &FilterState::default(), date(2024, 4, 2));
        let summary = summarize(&filtered);

        assert_eq!(summary.total_sales, 3);
        assert_eq!(summary.total_revenue, 225.0);
        assert_eq!(summary.total_clients, 2);
    }

    #[test]
    fn all_mode_with_all_months_is_a_no_op() {
        let sales = april_sales();
        let filter = filter_with(TimeMode::All, Some("all"));
        let filtered = filter_aggregates(&sales.daily_aggregates, &filter, date(2030, 1, 1));
        assert_eq!(filtered, sales.daily_aggregates);
    }

    #[test]
    fn daily_mode_keeps_only_today() {
        let sales = april_sales();
        let filtered = filter_aggregates(&sales.daily_aggregates, &filter_with(TimeMode::Daily, None), date(2024, 4, 2));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date, "2024-04-02");
    }

    #[test]
    fn weekly_without_week_uses_trailing_seven_days_not_the_month() {
        let sales = april_sales();
        let filter = filter_with(TimeMode::Weekly, Some("April 2024"));
        let filtered = filter_aggregates(&sales.daily_aggregates, &filter, date(2024, 4, 16));

        let dates: Vec<&str> = filtered.iter().map(|a| a.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-04-10", "2024-04-15"]);
    }

    #[test]
    fn weekly_with_selected_week_uses_the_week_range() {
        let sales = april_sales();
        let mut filter = filter_with(TimeMode::Weekly, Some("April 2024"));
        filter
            .select_week(WeekRange { start: date(2024, 4, 1), end: date(2024, 4, 7) })
            .unwrap();

        let filtered = filter_aggregates(&sales.daily_aggregates, &filter, date(2026, 1, 1));
        let dates: Vec<&str> = filtered.iter().map(|a| a.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-04-01", "2024-04-02"]);
    }

    #[test]
    fn monthly_mode_is_a_trailing_thirty_day_window_plus_month_filter() {
        let sales = april_sales();
        let today = date(2024, 4, 15);

        let filtered = filter_aggregates(&sales.daily_aggregates, &filter_with(TimeMode::Monthly, None), today);
        assert_eq!(filtered.len(), 5);
        assert_eq!(filtered[0].date, "2024-03-20");

        let filtered = filter_aggregates(
            &sales.daily_aggregates,
            &filter_with(TimeMode::Monthly, Some("April 2024")),
            today,
        );
        assert_eq!(filtered.len(), 4);
        assert!(filtered.iter().all(|a| a.month == "April"));
    }

    #[test]
    fn trailing_windows_hold_exactly_seven_and_thirty_dates() {
        let mut day = date(2024, 3, 30);
        let mut rows = Vec::new();
        while day <= date(2024, 4, 30) {
            rows.push(row(&day.format("%Y-%m-%d").to_string(), "1", "A"));
            day = day.succ_opt().unwrap();
        }
        let sales = normalize(&rows);
        let today = date(2024, 4, 30);

        let weekly = filter_aggregates(&sales.daily_aggregates, &filter_with(TimeMode::Weekly, None), today);
        assert_eq!(weekly.len(), 7);
        assert_eq!(weekly[0].date, "2024-04-24");
        assert!(weekly.iter().all(|a| a.date != "2024-04-23"));

        let monthly = filter_aggregates(&sales.daily_aggregates, &filter_with(TimeMode::Monthly, None), today);
        assert_eq!(monthly.len(), 30);
        assert_eq!(monthly[0].date, "2024-04-01");
        assert_eq!(monthly.last().unwrap().date, "2024-04-30");
    }

    #[test]
    fn lowercase_month_selection_matches_aggregates() {
        let sales = april_sales();
        let filter = filter_with(TimeMode::Monthly, Some("april 2024"));
        let filtered = filter_aggregates(&sales.daily_aggregates, &filter, date(2024, 4, 15));
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn dated_modes_exclude_the_unknown_bucket() {
        let sales = april_sales();
        let filtered = filter_aggregates(&sales.daily_aggregates, &filter_with(TimeMode::Monthly, None), date(2024, 4, 15));
        assert!(filtered.iter().all(|a| a.date != "Unknown"));
    }

    #[test]
    fn revenue_over_time_sorts_by_calendar_and_filters_year() {
        let sales = normalize(&[
            row("2024-02-01", "10", "A"),
            row("2023-12-05", "5", "A"),
            row("2024-04-03", "7", "A"),
            row("2024-04-20", "3", "A"),
            row("2024-10-01", "1", "A"),
        ]);

        let series = revenue_over_time(&sales.daily_aggregates, None);
        let labels: Vec<&str> = series.iter().map(|e| e.month.as_str()).collect();
        assert_eq!(labels, vec!["December 2023", "February 2024", "April 2024", "October 2024"]);
        assert_eq!(series[2].revenue, 10.0);

        let only_2023 = revenue_over_time(&sales.daily_aggregates, Some("2023"));
        assert_eq!(only_2023, vec![RevenueOverTimeEntry { month: "December 2023".to_string(), revenue: 5.0 }]);
    }

    #[test]
    fn person_view_ignores_time_filter() {
        let sales = april_sales();
        let mut filter = filter_with(TimeMode::Daily, None);
        filter.set_chart(ChartKind::Person);

        let view = build_view(&sales, None, &filter, date(2024, 4, 2), WeekConvention::Rolling);
        assert_eq!(view.summary.total_sales, 1);
        match view.chart {
            ChartSeries::Person(people) => {
                let total: f64 = people.iter().map(|p| p.revenue).sum();
                assert_eq!(total, 300.0);
            }
            other => panic!("série inesperada: {other:?}"),
        }
    }

    #[test]
    fn view_lists_weeks_of_selected_month() {
        let sales = april_sales();
        let filter = filter_with(TimeMode::Weekly, Some("April 2024"));
        let view = build_view(&sales, None, &filter, date(2024, 4, 16), WeekConvention::Rolling);

        assert_eq!(view.week_ranges.len(), 5);
        assert!(matches!(view.chart, ChartSeries::Sales(_)));
        assert_eq!(view.available_months.first().map(String::as_str), Some("March 2024"));
    }

    #[test]
    fn empty_input_yields_zeroed_view() {
        let view = build_view(
            &NormalizedSales::default(),
            None,
            &FilterState::default(),
            date(2024, 4, 1),
            WeekConvention::Rolling,
        );
        assert_eq!(view.summary, SummaryStats::default());
        assert_eq!(view.chart, ChartSeries::Sales(Vec::new()));
        assert!(view.week_ranges.is_empty());
    }
}
