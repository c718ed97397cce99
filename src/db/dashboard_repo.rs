// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::error::AppError,
    models::dashboard::{BrandEntry, MonthlyRow, PlatformEntry, RecentSale, StatusCount},
};

/// Números brutos; a montagem final fica no service.
pub struct DashboardSnapshot {
    pub status_counts: Vec<StatusCount>,
    pub monthly_revenue: Decimal,
    pub monthly_margin: Decimal,
    pub monthly_count: i64,
    pub recent_sales: Vec<RecentSale>,
    pub months: Vec<MonthlyRow>,
    pub platforms: Vec<PlatformEntry>,
    pub top_brands: Vec<BrandEntry>,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn snapshot(
        &self,
        month_start: NaiveDate,
        chart_start: NaiveDate,
    ) -> Result<DashboardSnapshot, AppError> {
        // Iniciamos uma transação (Snapshot consistente dos dados)
        let mut tx: Transaction<'_, Postgres> = self.pool.begin().await?;

        // A. Sacs por status
        let status_counts = sqlx::query_as::<_, StatusCount>(
            "SELECT status::TEXT AS status, COUNT(*) AS count FROM bags GROUP BY status",
        )
        .fetch_all(&mut *tx)
        .await?;

        // B. Vendas do mês
        let (monthly_revenue, monthly_margin, monthly_count): (Decimal, Decimal, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COALESCE(SUM(sale_price), 0),
                    COALESCE(SUM(margin), 0),
                    COUNT(*)
                FROM sales
                WHERE sale_date >= $1
                "#,
            )
            .bind(month_start)
            .fetch_one(&mut *tx)
            .await?;

        // C. Últimas vendas
        let recent_sales = sqlx::query_as::<_, RecentSale>(
            r#"
            SELECT
                s.id, s.sale_price, s.margin, s.sale_date,
                b.brand AS bag_brand, b.model AS bag_model, b.reference AS bag_reference
            FROM sales s
            LEFT JOIN bags b ON b.id = s.bag_id
            ORDER BY s.sale_date DESC, s.created_at DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        // D. Gráfico mensal
        let months = sqlx::query_as::<_, MonthlyRow>(
            r#"
            SELECT
                EXTRACT(YEAR FROM sale_date)::INT AS year,
                EXTRACT(MONTH FROM sale_date)::INT AS month,
                COALESCE(SUM(sale_price), 0) AS revenue,
                COALESCE(SUM(margin), 0) AS margin
            FROM sales
            WHERE sale_date >= $1
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(chart_start)
        .fetch_all(&mut *tx)
        .await?;

        // E. Por plataforma (nome bruto; o rótulo é aplicado no service)
        let platforms = sqlx::query_as::<_, PlatformEntry>(
            r#"
            SELECT
                sale_platform::TEXT AS name,
                COALESCE(SUM(sale_price), 0) AS value,
                COUNT(*) AS count
            FROM sales
            GROUP BY sale_platform
            ORDER BY value DESC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        // F. Top 5 marcas
        let top_brands = sqlx::query_as::<_, BrandEntry>(
            r#"
            SELECT
                b.brand AS brand,
                COALESCE(SUM(s.sale_price), 0) AS revenue,
                COALESCE(SUM(s.margin), 0) AS margin,
                COUNT(*) AS count
            FROM sales s
            JOIN bags b ON b.id = s.bag_id
            GROUP BY b.brand
            ORDER BY revenue DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSnapshot {
            status_counts,
            monthly_revenue,
            monthly_margin,
            monthly_count,
            recent_sales,
            months,
            platforms,
            top_brands,
        })
    }
}
