// src/services/import_service.rs
//
// Importação da planilha histórica: abas de compras, de vendedores e o
// histórico antigo viram sacs (e vendas). Cada linha é independente: uma
// falha vira uma mensagem em `errors` e a importação segue.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BagRepository, BankAccountRepository, SaleRepository},
    models::{
        bag::{BagCondition, BagStatus, NewBag, Platform},
        import::ImportResult,
        sale::NewSale,
    },
    services::{
        brand::BrandMatcher,
        margin::compute_margin,
        spreadsheet::{
            classify_sheet, read_history_row, read_purchase_row, read_seller_row, read_workbook,
            PurchaseRow, SheetKind, SoldRow,
        },
    },
};

pub const DEFAULT_ACCOUNT_LABEL: &str = "Non specifie";
const DUPLICATE_PREFIX_CHARS: usize = 50;
const REFURBISHER: &str = "Gianni";

#[derive(Clone)]
pub struct ImportService {
    pool: sqlx::PgPool,
    bag_repo: BagRepository,
    sale_repo: SaleRepository,
    bank_account_repo: BankAccountRepository,
    brands: BrandMatcher,
    seller_sheets: Vec<String>,
}

/// Contas usadas pela importação: uma por vendedor mais a padrão.
struct ImportAccounts {
    sellers: HashMap<String, Uuid>,
    default: Uuid,
}

impl ImportAccounts {
    fn for_sheet(&self, kind: &SheetKind) -> Uuid {
        match kind {
            SheetKind::Seller(name) => self.sellers.get(name).copied().unwrap_or(self.default),
            _ => self.default,
        }
    }
}

impl ImportService {
    pub fn new(
        pool: sqlx::PgPool,
        bag_repo: BagRepository,
        sale_repo: SaleRepository,
        bank_account_repo: BankAccountRepository,
        brands: BrandMatcher,
        seller_sheets: Vec<String>,
    ) -> Self {
        Self {
            pool,
            bag_repo,
            sale_repo,
            bank_account_repo,
            brands,
            seller_sheets,
        }
    }

    pub async fn import(&self, bytes: Vec<u8>, imported_by: Uuid) -> Result<ImportResult, AppError> {
        let sheets = read_workbook(bytes)?;
        let today = Utc::now().date_naive();
        let mut result = ImportResult::default();

        let accounts = self.ensure_accounts(imported_by, &mut result).await?;

        for sheet in &sheets {
            let kind = classify_sheet(&sheet.name, &self.seller_sheets);
            if kind == SheetKind::Ignored {
                tracing::debug!("Aba '{}' ignorada", sheet.name);
                continue;
            }
            let account = accounts.for_sheet(&kind);

            for row in &sheet.rows {
                let outcome = match &kind {
                    SheetKind::Purchases => match read_purchase_row(row) {
                        Some(purchase) => self.import_purchase(&purchase, account, imported_by, today).await,
                        None => Ok(RowOutcome::Skipped),
                    },
                    SheetKind::Seller(_) => match read_seller_row(row) {
                        Some(sold) => self.import_sold(&sold, account, imported_by, today, true).await,
                        None => Ok(RowOutcome::Skipped),
                    },
                    SheetKind::History => match read_history_row(row) {
                        Some(sold) => self.import_sold(&sold, account, imported_by, today, false).await,
                        None => Ok(RowOutcome::Skipped),
                    },
                    SheetKind::Ignored => Ok(RowOutcome::Skipped),
                };

                match outcome {
                    Ok(RowOutcome::Bag) => result.bags_created += 1,
                    Ok(RowOutcome::BagAndSale) => {
                        result.bags_created += 1;
                        result.sales_created += 1;
                    }
                    Ok(RowOutcome::Skipped) => result.skipped += 1,
                    Err(e) => {
                        tracing::warn!("Importação: linha {} de '{}' falhou: {}", row.line, sheet.name, e);
                        result.row_error(row.line, &sheet.name, e);
                    }
                }
            }
        }

        tracing::info!(
            "Importação concluída: {} sacs, {} vendas, {} contas, {} erros",
            result.bags_created,
            result.sales_created,
            result.bank_accounts_created,
            result.errors.len()
        );
        Ok(result)
    }

    async fn ensure_accounts(&self, created_by: Uuid, result: &mut ImportResult) -> Result<ImportAccounts, AppError> {
        let mut sellers = HashMap::new();
        for seller in &self.seller_sheets {
            let id = self
                .find_or_create_account(&capitalize(seller), "Compte importe depuis Excel", created_by, result)
                .await?;
            sellers.insert(seller.to_lowercase(), id);
        }

        let default = self
            .find_or_create_account(
                DEFAULT_ACCOUNT_LABEL,
                "Compte par defaut pour les achats sans compte specifie",
                created_by,
                result,
            )
            .await?;

        Ok(ImportAccounts { sellers, default })
    }

    async fn find_or_create_account(
        &self,
        label: &str,
        description: &str,
        created_by: Uuid,
        result: &mut ImportResult,
    ) -> Result<Uuid, AppError> {
        if let Some(account) = self.bank_account_repo.find_by_label_ci(&self.pool, label).await? {
            return Ok(account.id);
        }
        let account = self
            .bank_account_repo
            .create(&self.pool, label, Some(description), created_by)
            .await?;
        result.bank_accounts_created += 1;
        Ok(account.id)
    }

    async fn import_purchase(
        &self,
        row: &PurchaseRow,
        account: Uuid,
        created_by: Uuid,
        today: NaiveDate,
    ) -> Result<RowOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let prefix: String = row.description.chars().take(DUPLICATE_PREFIX_CHARS).collect();
        if self.bag_repo.exists_with_description(&mut *tx, &prefix).await? {
            return Ok(RowOutcome::Skipped);
        }

        let bag = purchase_bag(&self.brands, row, account, created_by, today);
        let reference = self.bag_repo.next_reference(&mut *tx, today.year()).await?;
        self.bag_repo.insert(&mut *tx, &reference, &bag).await?;

        tx.commit().await?;
        Ok(RowOutcome::Bag)
    }

    async fn import_sold(
        &self,
        row: &SoldRow,
        account: Uuid,
        created_by: Uuid,
        today: NaiveDate,
        refurbished: bool,
    ) -> Result<RowOutcome, AppError> {
        let new_bag = sold_bag(&self.brands, row, account, created_by, today, refurbished);

        let mut tx = self.pool.begin().await?;
        let reference = self.bag_repo.next_reference(&mut *tx, today.year()).await?;
        let bag = self.bag_repo.insert(&mut *tx, &reference, &new_bag).await?;
        self.sale_repo
            .insert(&mut *tx, &imported_sale(bag.id, &new_bag, created_by)?)
            .await?;
        tx.commit().await?;

        Ok(RowOutcome::BagAndSale)
    }
}

enum RowOutcome {
    Bag,
    BagAndSale,
    Skipped,
}

pub(crate) fn capitalize(name: &str) -> String {
    let name = name.trim();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Compra ainda em estoque: chegou, sem reforma.
fn purchase_bag(
    brands: &BrandMatcher,
    row: &PurchaseRow,
    account: Uuid,
    created_by: Uuid,
    today: NaiveDate,
) -> NewBag {
    let found = brands.extract(&row.description);
    NewBag {
        brand: found.brand,
        model: found.model,
        description: row.description.clone(),
        color: None,
        size: None,
        condition: BagCondition::TresBon,
        purchase_date: row.date.unwrap_or(today),
        purchase_price: row.price,
        purchase_platform: Platform::Autre,
        purchase_bank_account_id: account,
        refurbishment_cost: Decimal::ZERO,
        refurbishment_provider: None,
        refurbishment_notes: None,
        sale_date: None,
        sale_price: None,
        sale_platform: None,
        sale_notes: None,
        photos: Vec::new(),
        status: BagStatus::Recu,
        created_by,
    }
}

/// Sac já vendido. Nas abas de vendedor a coluna de frais é o custo de
/// reforma pago ao ateliê.
fn sold_bag(
    brands: &BrandMatcher,
    row: &SoldRow,
    account: Uuid,
    created_by: Uuid,
    today: NaiveDate,
    refurbished: bool,
) -> NewBag {
    let found = brands.extract(&row.description);
    let date = row.date.unwrap_or(today);
    let refurbishment_cost = if refurbished { row.fees } else { Decimal::ZERO };

    NewBag {
        brand: found.brand,
        model: found.model,
        description: row.description.clone(),
        color: None,
        size: None,
        condition: BagCondition::TresBon,
        purchase_date: date,
        purchase_price: row.purchase_price,
        purchase_platform: Platform::Autre,
        purchase_bank_account_id: account,
        refurbishment_cost,
        refurbishment_provider: (refurbishment_cost > Decimal::ZERO).then(|| REFURBISHER.to_string()),
        refurbishment_notes: None,
        sale_date: Some(date),
        sale_price: Some(row.sale_price),
        sale_platform: Some(Platform::Autre),
        sale_notes: None,
        photos: Vec::new(),
        status: BagStatus::Vendu,
        created_by,
    }
}

fn imported_sale(bag_id: Uuid, bag: &NewBag, sold_by: Uuid) -> Result<NewSale, AppError> {
    let sale_price = bag.sale_price.unwrap_or_default();
    let margin = compute_margin(
        sale_price,
        bag.purchase_price,
        bag.refurbishment_cost,
        Decimal::ZERO,
        Decimal::ZERO,
    )?;

    Ok(NewSale {
        bag_id,
        sale_date: bag.sale_date.unwrap_or(bag.purchase_date),
        sale_price,
        sale_platform: bag.sale_platform.unwrap_or(Platform::Autre),
        platform_fees: Decimal::ZERO,
        shipping_cost: Decimal::ZERO,
        bank_account_id: bag.purchase_bank_account_id,
        margin: margin.amount,
        margin_percent: margin.percent,
        notes: None,
        sold_by,
    })
}
