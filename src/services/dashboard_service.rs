// src/services/dashboard_service.rs

use chrono::NaiveDate;

use crate::{
    models::dashboard::{DashboardView, FilterState, NormalizedSales, WeekRange},
    services::{
        calendar::{self, WeekConvention},
        pipeline,
        poller::SnapshotStore,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    store: SnapshotStore,
    convention: WeekConvention,
}

impl DashboardService {
    pub fn new(store: SnapshotStore, convention: WeekConvention) -> Self {
        Self { store, convention }
    }

    /// Monta a visão sobre o snapshot mais recente. Antes da primeira leitura
    /// a visão sai zerada em vez de falhar.
    pub async fn get_view(&self, filter: &FilterState, today: NaiveDate) -> DashboardView {
        match self.store.current().await {
            Some(snapshot) => pipeline::build_view(
                &snapshot.sales,
                Some(snapshot.fetched_at),
                filter,
                today,
                self.convention,
            ),
            None => pipeline::build_view(&NormalizedSales::default(), None, filter, today, self.convention),
        }
    }

    pub fn get_week_ranges(&self, month: &str) -> Vec<WeekRange> {
        calendar::week_ranges(month, self.convention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{dashboard::ChartSeries, sheet::RawRecord},
        services::poller::SalesSnapshot,
    };
    use chrono::Utc;

    #[tokio::test]
    async fn empty_store_gives_zeroed_view() {
        let service = DashboardService::new(SnapshotStore::default(), WeekConvention::Rolling);
        let view = service
            .get_view(&FilterState::default(), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
            .await;

        assert_eq!(view.summary.total_sales, 0);
        assert_eq!(view.fetched_at, None);
        assert_eq!(view.chart, ChartSeries::Sales(Vec::new()));
    }

    #[tokio::test]
    async fn view_reflects_latest_snapshot() {
        let store = SnapshotStore::default();
        let service = DashboardService::new(store.clone(), WeekConvention::Rolling);
        let records = vec![RawRecord {
            date: Some("2024-04-01".to_string()),
            revenue: Some("42".to_string()),
            ..Default::default()
        }];
        let fetched_at = Utc::now();
        store.replace(SalesSnapshot::from_records(records, fetched_at)).await;

        let view = service
            .get_view(&FilterState::default(), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
            .await;
        assert_eq!(view.summary.total_revenue, 42.0);
        assert_eq!(view.fetched_at, Some(fetched_at));
    }

    #[test]
    fn week_ranges_follow_configured_convention() {
        let rolling = DashboardService::new(SnapshotStore::default(), WeekConvention::Rolling);
        let monday = DashboardService::new(SnapshotStore::default(), WeekConvention::StartsOn(chrono::Weekday::Mon));

        assert_eq!(rolling.get_week_ranges("May 2024")[0].end, NaiveDate::from_ymd_opt(2024, 5, 7).unwrap());
        assert_eq!(monday.get_week_ranges("May 2024")[0].end, NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
    }
}
