// src/services/bag_service.rs

use std::sync::Arc;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BagRepository, BankAccountRepository, SaleRepository},
    models::{
        auth::User,
        bag::{Bag, BagListQuery, BagListResponse, BagView, CreateBagPayload, UpdateBagPayload},
        pagination::{PageRequest, Pagination},
        sale::NewSale,
    },
    services::{
        email::{new_bag_email, sale_email, AdminNotifier, SaleEmailData},
        qr::{self, QrFormat, ScanTarget},
        status_sync::{plan_sale_sync, sale_from_bag, SaleSync},
        storage::BlobStore,
    },
};

#[derive(Clone)]
pub struct BagService {
    pool: sqlx::PgPool,
    bag_repo: BagRepository,
    sale_repo: SaleRepository,
    bank_account_repo: BankAccountRepository,
    blob_store: Arc<dyn BlobStore>,
    notifier: AdminNotifier,
    public_base_url: String,
}

impl BagService {
    pub fn new(
        pool: sqlx::PgPool,
        bag_repo: BagRepository,
        sale_repo: SaleRepository,
        bank_account_repo: BankAccountRepository,
        blob_store: Arc<dyn BlobStore>,
        notifier: AdminNotifier,
        public_base_url: String,
    ) -> Self {
        Self {
            pool,
            bag_repo,
            sale_repo,
            bank_account_repo,
            blob_store,
            notifier,
            public_base_url,
        }
    }

    pub async fn list(&self, query: &BagListQuery) -> Result<BagListResponse, AppError> {
        let filter = query.filter()?;
        let page = PageRequest::new(query.page, query.limit);
        let (bags, total) = self.bag_repo.list(&filter, page).await?;
        Ok(BagListResponse {
            bags,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<BagView, AppError> {
        self.bag_repo
            .find_view(id)
            .await?
            .ok_or_else(bag_not_found)
    }

    pub async fn create(&self, payload: CreateBagPayload, user: &User) -> Result<BagView, AppError> {
        let today = Utc::now().date_naive();
        let new_bag = payload.into_new_bag(user.id);

        let mut tx = self.pool.begin().await?;

        if !self
            .bank_account_repo
            .exists(&mut *tx, new_bag.purchase_bank_account_id)
            .await?
        {
            return Err(AppError::field("purchaseBankAccountId", "Compte bancaire non trouve"));
        }

        let reference = self.bag_repo.next_reference(&mut *tx, today.year()).await?;
        let bag = self.bag_repo.insert(&mut *tx, &reference, &new_bag).await?;

        // Criado já como vendido: a venda nasce junto
        let sale = if bag.status.is_sold() {
            let sale = sale_from_bag(&bag, user.id, today)?;
            self.record_sale_on_bag(&mut tx, &sale).await?;
            Some(sale)
        } else {
            None
        };

        tx.commit().await?;
        tracing::info!("Sac {} criado por {}", bag.reference, user.email);

        self.notifier
            .notify(new_bag_email(&bag.reference, &bag.brand, &bag.model, bag.purchase_price, &user.name))
            .await;
        if let Some(sale) = sale {
            self.notify_sale(&bag, &sale, &user.name).await;
        }

        self.get(bag.id).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdateBagPayload, user: &User) -> Result<BagView, AppError> {
        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await?;

        let before = self
            .bag_repo
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(bag_not_found)?;

        if let Some(account) = payload.purchase_bank_account_id {
            if !self.bank_account_repo.exists(&mut *tx, account).await? {
                return Err(AppError::field("purchaseBankAccountId", "Compte bancaire non trouve"));
            }
        }

        let mut after = before.clone();
        payload.apply_to(&mut after);

        let existing = self.sale_repo.find_by_bag(&mut *tx, id).await?;
        let plan = plan_sale_sync(&before, &after, &payload, existing.as_ref(), user.id, today)?;

        let created = match plan {
            SaleSync::Nothing => None,
            SaleSync::Create(sale) => {
                after.sale_date.get_or_insert(sale.sale_date);
                self.sale_repo.insert(&mut *tx, &sale).await?;
                Some(sale)
            }
            SaleSync::Delete(sale_id) => {
                self.sale_repo.delete(&mut *tx, sale_id).await?;
                tracing::info!("Venda {} removida: sac {} saiu de vendu", sale_id, after.reference);
                None
            }
            SaleSync::Patch(sale_id, changes) => {
                if !changes.is_empty() {
                    self.sale_repo.apply_changes(&mut *tx, sale_id, &changes).await?;
                }
                None
            }
        };

        let saved = self.bag_repo.save(&mut *tx, &after).await?;
        tx.commit().await?;

        if let Some(sale) = created {
            self.notify_sale(&saved, &sale, &user.name).await;
        }

        self.get(id).await
    }

    /// Sacs com venda não podem ser apagados; as fotos saem junto, sem
    /// bloquear a exclusão se o armazenamento falhar.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let bag = self
            .bag_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(bag_not_found)?;

        if self.sale_repo.find_by_bag(&self.pool, id).await?.is_some() {
            return Err(AppError::business("Ce sac a ete vendu. Supprimez d'abord la vente."));
        }

        self.bag_repo.delete(&self.pool, id).await?;
        tracing::info!("Sac {} removido", bag.reference);

        for url in &bag.photos {
            if let Err(e) = self.blob_store.delete(url).await {
                tracing::warn!("Falha ao remover foto {} do sac {}: {}", url, bag.reference, e);
            }
        }

        Ok(())
    }

    pub async fn qr_code(&self, id: Uuid, format: QrFormat) -> Result<Vec<u8>, AppError> {
        let bag = self.get(id).await?;
        qr::render(&qr::bag_url(&self.public_base_url, bag.bag.id), format)
    }

    pub async fn find_by_scan(&self, text: &str) -> Result<BagView, AppError> {
        let found = match qr::resolve_scanned_code(text)? {
            ScanTarget::Id(id) => self.bag_repo.find_view(id).await?,
            ScanTarget::Reference(reference) => self.bag_repo.find_view_by_reference(&reference).await?,
        };
        found.ok_or_else(bag_not_found)
    }

    async fn record_sale_on_bag(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        sale: &NewSale,
    ) -> Result<(), AppError> {
        self.sale_repo.insert(&mut **tx, sale).await?;
        self.bag_repo
            .mark_sold(
                &mut **tx,
                sale.bag_id,
                sale.sale_date,
                sale.sale_price,
                sale.sale_platform,
                sale.notes.as_deref(),
            )
            .await
    }

    async fn notify_sale(&self, bag: &Bag, sale: &NewSale, seller_name: &str) {
        self.notifier
            .notify(sale_email(&SaleEmailData {
                reference: &bag.reference,
                brand: &bag.brand,
                model: &bag.model,
                sale_price: sale.sale_price,
                margin: sale.margin,
                margin_percent: sale.margin_percent,
                sold_by_name: seller_name,
            }))
            .await;
    }
}

fn bag_not_found() -> AppError {
    AppError::not_found("Sac non trouve")
}
