// src/db/bag_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::like_pattern, error::AppError},
    models::{
        bag::{format_reference, Bag, BagFilter, BagStatus, BagView, NewBag, Platform},
        pagination::PageRequest,
    },
};

const VIEW_SELECT: &str = r#"
    SELECT
        b.*,
        ba.label AS purchase_bank_account_label,
        u.name AS created_by_name
    FROM bags b
    LEFT JOIN bank_accounts ba ON ba.id = b.purchase_bank_account_id
    LEFT JOIN users u ON u.id = b.created_by
"#;

#[derive(Clone)]
pub struct BagRepository {
    pool: PgPool,
}

impl BagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Bag>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bag = sqlx::query_as::<_, Bag>("SELECT * FROM bags WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(bag)
    }

    /// Trava a linha do sac até o fim da transação. Toda alteração que
    /// envolve sac + venda passa por aqui primeiro.
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Bag>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bag = sqlx::query_as::<_, Bag>("SELECT * FROM bags WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(bag)
    }

    pub async fn find_view(&self, id: Uuid) -> Result<Option<BagView>, AppError> {
        let query = format!("{} WHERE b.id = $1", VIEW_SELECT);
        let bag = sqlx::query_as::<_, BagView>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bag)
    }

    pub async fn find_view_by_reference(&self, reference: &str) -> Result<Option<BagView>, AppError> {
        let query = format!("{} WHERE UPPER(b.reference) = UPPER($1)", VIEW_SELECT);
        let bag = sqlx::query_as::<_, BagView>(&query)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bag)
    }

    pub async fn list(
        &self,
        filter: &BagFilter,
        page: PageRequest,
    ) -> Result<(Vec<BagView>, i64), AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(VIEW_SELECT);
        push_filters(&mut builder, filter);
        builder
            .push(" ORDER BY b.created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let bags = builder
            .build_query_as::<BagView>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bags b");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((bags, total))
    }

    /// Todos os sacs para exportação, mais recentes primeiro.
    pub async fn list_for_export(&self) -> Result<Vec<BagView>, AppError> {
        let query = format!("{} ORDER BY b.created_at DESC", VIEW_SELECT);
        let bags = sqlx::query_as::<_, BagView>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(bags)
    }

    /// Já existe um sac cuja descrição contém este trecho? (import de compras)
    pub async fn exists_with_description<'e, E>(&self, executor: E, fragment: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bags WHERE description ILIKE $1)")
                .bind(like_pattern(fragment))
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    // ---
    // Escrita (aceitam a transação como executor)
    // ---

    /// Próxima referência, tirada da sequence (atômica entre requisições).
    pub async fn next_reference<'e, E>(&self, executor: E, year: i32) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sequence: i64 = sqlx::query_scalar("SELECT nextval('bag_reference_seq')")
            .fetch_one(executor)
            .await?;
        Ok(format_reference(year, sequence))
    }

    pub async fn insert<'e, E>(&self, executor: E, reference: &str, bag: &NewBag) -> Result<Bag, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Bag>(
            r#"
            INSERT INTO bags (
                reference, brand, model, description, color, size, condition,
                purchase_date, purchase_price, purchase_platform, purchase_bank_account_id,
                refurbishment_cost, refurbishment_provider, refurbishment_notes,
                sale_date, sale_price, sale_platform, sale_notes,
                photos, status, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21)
            RETURNING *
            "#,
        )
        .bind(reference)
        .bind(&bag.brand)
        .bind(&bag.model)
        .bind(&bag.description)
        .bind(&bag.color)
        .bind(&bag.size)
        .bind(bag.condition)
        .bind(bag.purchase_date)
        .bind(bag.purchase_price)
        .bind(bag.purchase_platform)
        .bind(bag.purchase_bank_account_id)
        .bind(bag.refurbishment_cost)
        .bind(&bag.refurbishment_provider)
        .bind(&bag.refurbishment_notes)
        .bind(bag.sale_date)
        .bind(bag.sale_price)
        .bind(bag.sale_platform)
        .bind(&bag.sale_notes)
        .bind(&bag.photos)
        .bind(bag.status)
        .bind(bag.created_by)
        .fetch_one(executor)
        .await?;
        Ok(created)
    }

    /// Grava o estado completo (já mesclado) do sac.
    pub async fn save<'e, E>(&self, executor: E, bag: &Bag) -> Result<Bag, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saved = sqlx::query_as::<_, Bag>(
            r#"
            UPDATE bags SET
                brand = $2, model = $3, description = $4, color = $5, size = $6,
                condition = $7, purchase_date = $8, purchase_price = $9,
                purchase_platform = $10, purchase_bank_account_id = $11,
                refurbishment_cost = $12, refurbishment_provider = $13,
                refurbishment_notes = $14, sale_date = $15, sale_price = $16,
                sale_platform = $17, sale_notes = $18, photos = $19, status = $20,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(bag.id)
        .bind(&bag.brand)
        .bind(&bag.model)
        .bind(&bag.description)
        .bind(&bag.color)
        .bind(&bag.size)
        .bind(bag.condition)
        .bind(bag.purchase_date)
        .bind(bag.purchase_price)
        .bind(bag.purchase_platform)
        .bind(bag.purchase_bank_account_id)
        .bind(bag.refurbishment_cost)
        .bind(&bag.refurbishment_provider)
        .bind(&bag.refurbishment_notes)
        .bind(bag.sale_date)
        .bind(bag.sale_price)
        .bind(bag.sale_platform)
        .bind(&bag.sale_notes)
        .bind(&bag.photos)
        .bind(bag.status)
        .fetch_one(executor)
        .await?;
        Ok(saved)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: BagStatus) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE bags SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Marca o sac como vendido copiando os dados da venda.
    pub async fn mark_sold<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        sale_date: NaiveDate,
        sale_price: Decimal,
        sale_platform: Platform,
        sale_notes: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE bags SET
                status = 'vendu',
                sale_date = $2,
                sale_price = $3,
                sale_platform = $4,
                sale_notes = COALESCE($5, sale_notes),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(sale_date)
        .bind(sale_price)
        .bind(sale_platform)
        .bind(sale_notes)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM bags WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &BagFilter) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND b.status = ").push_bind(status);
    }
    if let Some(brand) = &filter.brand {
        builder.push(" AND b.brand = ").push_bind(brand.clone());
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (b.reference ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.brand ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.model ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_filters_build_expected_sql() {
        let filter = BagFilter {
            status: Some(BagStatus::EnVente),
            brand: Some("Chanel".into()),
            search: Some("timeless".into()),
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bags b");
        push_filters(&mut builder, &filter);
        let sql = builder.sql();

        assert!(sql.contains("b.status = $1"));
        assert!(sql.contains("b.brand = $2"));
        assert!(sql.contains("b.description ILIKE $6"));
    }

    #[test]
    fn empty_filter_adds_no_conditions() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bags b");
        push_filters(&mut builder, &BagFilter::default());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM bags b WHERE TRUE");
    }
}
