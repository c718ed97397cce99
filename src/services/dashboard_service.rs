// src/services/dashboard_service.rs

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{dashboard_repo::DashboardSnapshot, DashboardRepository},
    models::{
        bag::{BagStatus, Platform},
        dashboard::{DashboardStats, MonthlyEntry, MonthlyRow, PlatformEntry},
    },
};

const CHART_MONTHS: u32 = 6;
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Fev", "Mar", "Avr", "Mai", "Juin", "Juil", "Aout", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_stats(&self) -> Result<DashboardStats, AppError> {
        let today = Utc::now().date_naive();
        let month_start = first_of_month(today);
        let chart_start = chart_start(today);

        let snapshot = self.repo.snapshot(month_start, chart_start).await?;
        Ok(build_stats(snapshot, today))
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

// Primeiro dia do mês, cinco meses atrás (seis meses no gráfico)
fn chart_start(today: NaiveDate) -> NaiveDate {
    first_of_month(today)
        .checked_sub_months(Months::new(CHART_MONTHS - 1))
        .unwrap_or(today)
}

fn platform_label(raw: &str) -> String {
    match raw.parse::<Platform>() {
        Ok(Platform::Vinted) => "Vinted".into(),
        Ok(Platform::VestiaireCollectif) => "Vestiaire Collectif".into(),
        Ok(Platform::Leboncoin) => "Le Bon Coin".into(),
        Ok(Platform::Autre) => "Autre".into(),
        Err(_) => raw.to_string(),
    }
}

/// Seis meses em ordem, com zero nos meses sem venda.
fn monthly_chart(rows: &[MonthlyRow], today: NaiveDate) -> Vec<MonthlyEntry> {
    let start = chart_start(today);
    (0..CHART_MONTHS)
        .filter_map(|offset| start.checked_add_months(Months::new(offset)))
        .map(|month| {
            let row = rows
                .iter()
                .find(|r| r.year == month.year() && r.month as u32 == month.month());
            MonthlyEntry {
                month: MONTH_NAMES[month.month0() as usize].to_string(),
                revenue: row.map(|r| r.revenue).unwrap_or(Decimal::ZERO),
                margin: row.map(|r| r.margin).unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

fn build_stats(snapshot: DashboardSnapshot, today: NaiveDate) -> DashboardStats {
    // Todos os status aparecem, mesmo com zero
    let mut bags_by_status: BTreeMap<String, i64> = BagStatus::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    for row in &snapshot.status_counts {
        bags_by_status.insert(row.status.clone(), row.count);
    }

    let total_in_stock = snapshot
        .status_counts
        .iter()
        .filter(|row| row.status != BagStatus::Vendu.as_str())
        .map(|row| row.count)
        .sum();

    DashboardStats {
        bags_by_status,
        total_in_stock,
        monthly_revenue: snapshot.monthly_revenue,
        monthly_margin: snapshot.monthly_margin,
        sales_count: snapshot.monthly_count,
        recent_sales: snapshot.recent_sales,
        chart_data: monthly_chart(&snapshot.months, today),
        platform_chart_data: snapshot
            .platforms
            .into_iter()
            .map(|p| PlatformEntry {
                name: platform_label(&p.name),
                ..p
            })
            .collect(),
        top_brands: snapshot.top_brands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::StatusCount;
    use crate::test_support::{dec, ymd};

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            status_counts: vec![
                StatusCount { status: "en_vente".into(), count: 4 },
                StatusCount { status: "recu".into(), count: 2 },
                StatusCount { status: "vendu".into(), count: 7 },
            ],
            monthly_revenue: dec("900"),
            monthly_margin: dec("250"),
            monthly_count: 3,
            recent_sales: vec![],
            months: vec![
                MonthlyRow { year: 2024, month: 12, revenue: dec("300"), margin: dec("90") },
                MonthlyRow { year: 2025, month: 3, revenue: dec("900"), margin: dec("250") },
            ],
            platforms: vec![PlatformEntry { name: "vestiaire_collectif".into(), value: dec("1200"), count: 5 }],
            top_brands: vec![],
        }
    }

    #[test]
    fn chart_covers_six_months_across_year_boundary() {
        let today = ymd(2025, 3, 15);
        assert_eq!(chart_start(today), ymd(2024, 10, 1));

        let stats = build_stats(snapshot(), today);
        let months: Vec<&str> = stats.chart_data.iter().map(|e| e.month.as_str()).collect();
        assert_eq!(months, ["Oct", "Nov", "Dec", "Jan", "Fev", "Mar"]);
        assert_eq!(stats.chart_data[2].revenue, dec("300"));
        assert_eq!(stats.chart_data[3].revenue, Decimal::ZERO);
        assert_eq!(stats.chart_data[5].margin, dec("250"));
    }

    #[test]
    fn stock_excludes_sold_bags() {
        let stats = build_stats(snapshot(), ymd(2025, 3, 15));
        assert_eq!(stats.total_in_stock, 6);
        assert_eq!(stats.bags_by_status["vendu"], 7);
        assert_eq!(stats.bags_by_status["en_transit"], 0);
        assert_eq!(stats.bags_by_status.len(), 7);
        assert_eq!(stats.sales_count, 3);
    }

    #[test]
    fn platforms_get_display_labels() {
        let stats = build_stats(snapshot(), ymd(2025, 3, 15));
        assert_eq!(stats.platform_chart_data[0].name, "Vestiaire Collectif");
        assert_eq!(platform_label("leboncoin"), "Le Bon Coin");
    }
}
