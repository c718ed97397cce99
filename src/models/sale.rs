// src/models/sale.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    dates::{deserialize_date, deserialize_optional_date, parse_flexible_date},
    error::AppError,
    validation::{validate_not_negative, validate_price},
};
use crate::models::{
    bag::{BagCondition, Platform},
    pagination::Pagination,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub bag_id: Uuid,
    pub sale_date: NaiveDate,
    pub sale_price: Decimal,
    pub sale_platform: Platform,
    pub platform_fees: Decimal,
    pub shipping_cost: Decimal,
    pub bank_account_id: Uuid,
    pub margin: Decimal,
    pub margin_percent: Decimal,
    pub notes: Option<String>,
    pub sold_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Venda com os dados do sac, da conta e do vendedor.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sale: Sale,
    pub bag_reference: Option<String>,
    pub bag_brand: Option<String>,
    pub bag_model: Option<String>,
    pub bag_photos: Option<Vec<String>>,
    pub bag_purchase_price: Option<Decimal>,
    pub bag_refurbishment_cost: Option<Decimal>,
    pub bag_condition: Option<BagCondition>,
    pub bank_account_label: Option<String>,
    pub sold_by_name: Option<String>,
}

/// Linha pronta para INSERT, com a margem já calculada.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub bag_id: Uuid,
    pub sale_date: NaiveDate,
    pub sale_price: Decimal,
    pub sale_platform: Platform,
    pub platform_fees: Decimal,
    pub shipping_cost: Decimal,
    pub bank_account_id: Uuid,
    pub margin: Decimal,
    pub margin_percent: Decimal,
    pub notes: Option<String>,
    pub sold_by: Uuid,
}

/// Alterações a aplicar numa venda existente. `margin` só vem preenchido
/// quando precisa ser recalculada.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleChanges {
    pub sale_date: Option<NaiveDate>,
    pub sale_price: Option<Decimal>,
    pub sale_platform: Option<Platform>,
    pub platform_fees: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    pub bank_account_id: Option<Uuid>,
    pub notes: Option<String>,
    pub margin: Option<(Decimal, Decimal)>,
}

impl SaleChanges {
    pub fn is_empty(&self) -> bool {
        *self == SaleChanges::default()
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub bag_id: Uuid,
    #[serde(deserialize_with = "deserialize_date")]
    pub sale_date: NaiveDate,
    #[validate(custom(function = "validate_price"))]
    pub sale_price: Decimal,
    pub sale_platform: Platform,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub platform_fees: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub shipping_cost: Decimal,
    pub bank_account_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalePayload {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub sale_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_price"))]
    pub sale_price: Option<Decimal>,
    pub sale_platform: Option<Platform>,
    #[validate(custom(function = "validate_not_negative"))]
    pub platform_fees: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub shipping_cost: Option<Decimal>,
    pub bank_account_id: Option<Uuid>,
    pub notes: Option<String>,
}

// --- Listagem ---

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SaleListQuery {
    /// Conta bancária, ou `all`
    pub bank_account_id: Option<String>,
    /// Plataforma de venda, ou `all`
    pub platform: Option<String>,
    /// Marca do sac, ou `all`
    pub brand: Option<String>,
    /// Data inicial (inclusiva)
    pub start_date: Option<String>,
    /// Data final (inclusiva)
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct SaleFilter {
    pub bank_account_id: Option<Uuid>,
    pub platform: Option<Platform>,
    pub brand: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SaleListQuery {
    pub fn filter(&self) -> Result<SaleFilter, AppError> {
        let bank_account_id = match active(&self.bank_account_id) {
            Some(raw) => Some(
                raw.parse::<Uuid>()
                    .map_err(|_| AppError::field("bankAccountId", "Compte bancaire invalide"))?,
            ),
            None => None,
        };
        let platform = match active(&self.platform) {
            Some(raw) => Some(raw.parse::<Platform>()?),
            None => None,
        };
        let start_date = match active(&self.start_date) {
            Some(raw) => Some(
                parse_flexible_date(raw)
                    .ok_or_else(|| AppError::field("startDate", "Date de debut invalide"))?,
            ),
            None => None,
        };
        let end_date = match active(&self.end_date) {
            Some(raw) => Some(
                parse_flexible_date(raw)
                    .ok_or_else(|| AppError::field("endDate", "Date de fin invalide"))?,
            ),
            None => None,
        };

        Ok(SaleFilter {
            bank_account_id,
            platform,
            brand: active(&self.brand).map(str::to_string),
            start_date,
            end_date,
        })
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleListResponse {
    pub sales: Vec<SaleView>,
    pub pagination: Pagination,
}
