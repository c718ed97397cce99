// src/db/sale_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::{
        pagination::PageRequest,
        sale::{NewSale, Sale, SaleChanges, SaleFilter, SaleView},
    },
};

const VIEW_SELECT: &str = r#"
    SELECT
        s.*,
        b.reference AS bag_reference,
        b.brand AS bag_brand,
        b.model AS bag_model,
        b.photos AS bag_photos,
        b.purchase_price AS bag_purchase_price,
        b.refurbishment_cost AS bag_refurbishment_cost,
        b.condition AS bag_condition,
        ba.label AS bank_account_label,
        u.name AS sold_by_name
    FROM sales s
    LEFT JOIN bags b ON b.id = s.bag_id
    LEFT JOIN bank_accounts ba ON ba.id = s.bank_account_id
    LEFT JOIN users u ON u.id = s.sold_by
"#;

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn find_by_bag<'e, E>(&self, executor: E, bag_id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE bag_id = $1")
            .bind(bag_id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn find_view(&self, id: Uuid) -> Result<Option<SaleView>, AppError> {
        let query = format!("{} WHERE s.id = $1", VIEW_SELECT);
        let sale = sqlx::query_as::<_, SaleView>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    pub async fn list(
        &self,
        filter: &SaleFilter,
        page: PageRequest,
    ) -> Result<(Vec<SaleView>, i64), AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(VIEW_SELECT);
        push_filters(&mut builder, filter);
        builder
            .push(" ORDER BY s.sale_date DESC, s.created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let sales = builder
            .build_query_as::<SaleView>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM sales s LEFT JOIN bags b ON b.id = s.bag_id",
        );
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((sales, total))
    }

    pub async fn list_for_export(&self) -> Result<Vec<SaleView>, AppError> {
        let query = format!("{} ORDER BY s.sale_date DESC, s.created_at DESC", VIEW_SELECT);
        let sales = sqlx::query_as::<_, SaleView>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// A constraint UNIQUE(bag_id) é a garantia final de uma venda por sac.
    pub async fn insert<'e, E>(&self, executor: E, sale: &NewSale) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                bag_id, sale_date, sale_price, sale_platform, platform_fees,
                shipping_cost, bank_account_id, margin, margin_percent, notes, sold_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(sale.bag_id)
        .bind(sale.sale_date)
        .bind(sale.sale_price)
        .bind(sale.sale_platform)
        .bind(sale.platform_fees)
        .bind(sale.shipping_cost)
        .bind(sale.bank_account_id)
        .bind(sale.margin)
        .bind(sale.margin_percent)
        .bind(&sale.notes)
        .bind(sale.sold_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "sales_bag_id_key") {
                return AppError::business("Une vente existe deja pour ce sac");
            }
            e.into()
        })
    }

    pub async fn apply_changes<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &SaleChanges,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales SET
                sale_date = COALESCE($2, sale_date),
                sale_price = COALESCE($3, sale_price),
                sale_platform = COALESCE($4, sale_platform),
                platform_fees = COALESCE($5, platform_fees),
                shipping_cost = COALESCE($6, shipping_cost),
                bank_account_id = COALESCE($7, bank_account_id),
                notes = COALESCE($8, notes),
                margin = COALESCE($9, margin),
                margin_percent = COALESCE($10, margin_percent),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.sale_date)
        .bind(changes.sale_price)
        .bind(changes.sale_platform)
        .bind(changes.platform_fees)
        .bind(changes.shipping_cost)
        .bind(changes.bank_account_id)
        .bind(&changes.notes)
        .bind(changes.margin.map(|(margin, _)| margin))
        .bind(changes.margin.map(|(_, percent)| percent))
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &SaleFilter) {
    builder.push(" WHERE TRUE");
    if let Some(account) = filter.bank_account_id {
        builder.push(" AND s.bank_account_id = ").push_bind(account);
    }
    if let Some(platform) = filter.platform {
        builder.push(" AND s.sale_platform = ").push_bind(platform);
    }
    if let Some(brand) = &filter.brand {
        builder.push(" AND b.brand = ").push_bind(brand.clone());
    }
    if let Some(start) = filter.start_date {
        builder.push(" AND s.sale_date >= ").push_bind(start);
    }
    // Data final inclusiva (sale_date é DATE)
    if let Some(end) = filter.end_date {
        builder.push(" AND s.sale_date <= ").push_bind(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bag::Platform;
    use crate::test_support::ymd;

    #[test]
    fn date_range_is_inclusive() {
        let filter = SaleFilter {
            platform: Some(Platform::Vinted),
            start_date: Some(ymd(2025, 1, 1)),
            end_date: Some(ymd(2025, 1, 31)),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sales s");
        push_filters(&mut builder, &filter);

        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM sales s WHERE TRUE AND s.sale_platform = $1 \
             AND s.sale_date >= $2 AND s.sale_date <= $3"
        );
    }
}
