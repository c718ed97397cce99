// src/services/sale_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BagRepository, BankAccountRepository, SaleRepository},
    models::{
        auth::User,
        bag::{Bag, BagStatus},
        pagination::{PageRequest, Pagination},
        sale::{
            CreateSalePayload, NewSale, Sale, SaleChanges, SaleListQuery, SaleListResponse, SaleView,
            UpdateSalePayload,
        },
    },
    services::{
        email::{sale_email, AdminNotifier, SaleEmailData},
        margin::compute_margin,
    },
};

#[derive(Clone)]
pub struct SaleService {
    pool: sqlx::PgPool,
    sale_repo: SaleRepository,
    bag_repo: BagRepository,
    bank_account_repo: BankAccountRepository,
    notifier: AdminNotifier,
}

impl SaleService {
    pub fn new(
        pool: sqlx::PgPool,
        sale_repo: SaleRepository,
        bag_repo: BagRepository,
        bank_account_repo: BankAccountRepository,
        notifier: AdminNotifier,
    ) -> Self {
        Self {
            pool,
            sale_repo,
            bag_repo,
            bank_account_repo,
            notifier,
        }
    }

    pub async fn list(&self, query: &SaleListQuery) -> Result<SaleListResponse, AppError> {
        let filter = query.filter()?;
        let page = PageRequest::new(query.page, query.limit);
        let (sales, total) = self.sale_repo.list(&filter, page).await?;
        Ok(SaleListResponse {
            sales,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<SaleView, AppError> {
        self.sale_repo
            .find_view(id)
            .await?
            .ok_or_else(sale_not_found)
    }

    /// Registra a venda e marca o sac como vendido na mesma transação.
    pub async fn create(&self, payload: CreateSalePayload, user: &User) -> Result<SaleView, AppError> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE: duas vendas simultâneas do mesmo sac se serializam aqui
        let bag = self
            .bag_repo
            .lock_by_id(&mut *tx, payload.bag_id)
            .await?
            .ok_or_else(|| AppError::not_found("Sac non trouve"))?;

        ensure_sellable(&bag, self.sale_repo.find_by_bag(&mut *tx, bag.id).await?.as_ref())?;

        if !self.bank_account_repo.exists(&mut *tx, payload.bank_account_id).await? {
            return Err(AppError::field("bankAccountId", "Compte bancaire non trouve"));
        }

        let new_sale = build_sale(&bag, &payload, user.id)?;
        let sale = self.sale_repo.insert(&mut *tx, &new_sale).await?;
        self.bag_repo
            .mark_sold(
                &mut *tx,
                bag.id,
                sale.sale_date,
                sale.sale_price,
                sale.sale_platform,
                sale.notes.as_deref(),
            )
            .await?;

        tx.commit().await?;
        tracing::info!("Venda do sac {} registrada por {}", bag.reference, user.email);

        self.notifier
            .notify(sale_email(&SaleEmailData {
                reference: &bag.reference,
                brand: &bag.brand,
                model: &bag.model,
                sale_price: sale.sale_price,
                margin: sale.margin,
                margin_percent: sale.margin_percent,
                sold_by_name: &user.name,
            }))
            .await;

        self.get(sale.id).await
    }

    /// A margem é sempre recalculada com o custo atual do sac.
    pub async fn update(&self, id: Uuid, payload: UpdateSalePayload) -> Result<SaleView, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self
            .sale_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(sale_not_found)?;
        let bag = self
            .bag_repo
            .lock_by_id(&mut *tx, sale.bag_id)
            .await?
            .ok_or_else(|| AppError::not_found("Sac non trouve"))?;

        if let Some(account) = payload.bank_account_id {
            if !self.bank_account_repo.exists(&mut *tx, account).await? {
                return Err(AppError::field("bankAccountId", "Compte bancaire non trouve"));
            }
        }

        let changes = sale_changes(&sale, &bag, payload)?;
        let updated = self.sale_repo.apply_changes(&mut *tx, id, &changes).await?;

        // O sac espelha os dados de venda
        self.bag_repo
            .mark_sold(
                &mut *tx,
                bag.id,
                updated.sale_date,
                updated.sale_price,
                updated.sale_platform,
                updated.notes.as_deref(),
            )
            .await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Desfaz a venda: o sac volta para `en_vente`.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self
            .sale_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(sale_not_found)?;

        self.bag_repo.set_status(&mut *tx, sale.bag_id, BagStatus::EnVente).await?;
        self.sale_repo.delete(&mut *tx, id).await?;

        tx.commit().await?;
        tracing::info!("Venda {} removida, sac {} de volta a en_vente", id, sale.bag_id);
        Ok(())
    }
}

fn sale_not_found() -> AppError {
    AppError::not_found("Vente non trouvee")
}

fn ensure_sellable(bag: &Bag, existing: Option<&Sale>) -> Result<(), AppError> {
    if bag.status.is_sold() {
        return Err(AppError::business("Ce sac a deja ete vendu"));
    }
    if existing.is_some() {
        return Err(AppError::business("Une vente existe deja pour ce sac"));
    }
    Ok(())
}

fn build_sale(bag: &Bag, payload: &CreateSalePayload, seller: Uuid) -> Result<NewSale, AppError> {
    let margin = compute_margin(
        payload.sale_price,
        bag.purchase_price,
        bag.refurbishment_cost,
        payload.platform_fees,
        payload.shipping_cost,
    )?;

    Ok(NewSale {
        bag_id: bag.id,
        sale_date: payload.sale_date,
        sale_price: payload.sale_price,
        sale_platform: payload.sale_platform,
        platform_fees: payload.platform_fees,
        shipping_cost: payload.shipping_cost,
        bank_account_id: payload.bank_account_id,
        margin: margin.amount,
        margin_percent: margin.percent,
        notes: payload
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        sold_by: seller,
    })
}

fn sale_changes(sale: &Sale, bag: &Bag, payload: UpdateSalePayload) -> Result<SaleChanges, AppError> {
    let margin = compute_margin(
        payload.sale_price.unwrap_or(sale.sale_price),
        bag.purchase_price,
        bag.refurbishment_cost,
        payload.platform_fees.unwrap_or(sale.platform_fees),
        payload.shipping_cost.unwrap_or(sale.shipping_cost),
    )?;

    Ok(SaleChanges {
        sale_date: payload.sale_date,
        sale_price: payload.sale_price,
        sale_platform: payload.sale_platform,
        platform_fees: payload.platform_fees,
        shipping_cost: payload.shipping_cost,
        bank_account_id: payload.bank_account_id,
        notes: payload.notes,
        margin: Some((margin.amount, margin.percent)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bag::Platform;
    use rust_decimal::Decimal;
    use crate::test_support::{dec, sample_bag, sample_sale, ymd};

    fn payload(bag: &Bag) -> CreateSalePayload {
        CreateSalePayload {
            bag_id: bag.id,
            sale_date: ymd(2025, 2, 1),
            sale_price: dec("200"),
            sale_platform: Platform::Vinted,
            platform_fees: dec("10"),
            shipping_cost: dec("5"),
            bank_account_id: bag.purchase_bank_account_id,
            notes: Some("  ".into()),
        }
    }

    #[test]
    fn new_sale_carries_computed_margin() {
        let bag = sample_bag(BagStatus::EnVente);
        let seller = Uuid::new_v4();
        let sale = build_sale(&bag, &payload(&bag), seller).unwrap();

        assert_eq!(sale.margin, dec("65"));
        assert_eq!(sale.margin_percent, dec("54.17"));
        assert_eq!(sale.sold_by, seller);
        assert_eq!(sale.notes, None);
    }

    #[test]
    fn sold_bags_cannot_be_sold_again() {
        let sold = sample_bag(BagStatus::Vendu);
        assert_eq!(ensure_sellable(&sold, None).unwrap_err().to_string(), "Ce sac a deja ete vendu");

        let listed = sample_bag(BagStatus::EnVente);
        let sale = sample_sale(&listed);
        assert_eq!(
            ensure_sellable(&listed, Some(&sale)).unwrap_err().to_string(),
            "Une vente existe deja pour ce sac"
        );
        assert!(ensure_sellable(&listed, None).is_ok());
    }

    #[test]
    fn update_always_recomputes_margin_from_bag_cost() {
        let mut bag = sample_bag(BagStatus::Vendu);
        let sale = sample_sale(&bag);
        // Custo de reforma mudou depois da venda
        bag.refurbishment_cost = dec("50");

        let changes = sale_changes(
            &sale,
            &bag,
            UpdateSalePayload { shipping_cost: Some(dec("0")), ..Default::default() },
        )
        .unwrap();
        // 200 - 150 - 10 = 40 ; 40 / 150
        assert_eq!(changes.margin, Some((dec("40"), dec("26.67"))));
        assert_eq!(changes.sale_price, None);
    }

    #[test]
    fn huge_fees_on_a_cheap_bag_are_rejected_without_panicking() {
        let mut bag = sample_bag(BagStatus::EnVente);
        bag.purchase_price = dec("0.01");
        bag.refurbishment_cost = Decimal::ZERO;
        let mut huge = payload(&bag);
        huge.sale_price = dec("70000000000000000000000000000");
        huge.platform_fees = Decimal::ZERO;
        huge.shipping_cost = Decimal::ZERO;

        let err = build_sale(&bag, &huge, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.to_string(), "Montant hors limites");

        // Antes disso, a validação do payload já barra o valor
        use validator::Validate;
        assert!(huge.validate().is_err());
    }
}
