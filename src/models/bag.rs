// src/models/bag.rs

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    dates::{deserialize_date, deserialize_optional_date},
    error::AppError,
    validation::validate_price,
};
use crate::models::pagination::Pagination;

// --- Enums (mapeados para os tipos ENUM do Postgres) ---

/// Ciclo de vida de um sac, na ordem em que normalmente acontece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "bag_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BagStatus {
    EnCommande,
    EnTransit,
    Recu,
    EnRemiseEnEtat,
    PretAVendre,
    EnVente,
    Vendu,
}

impl BagStatus {
    pub const ALL: [BagStatus; 7] = [
        BagStatus::EnCommande,
        BagStatus::EnTransit,
        BagStatus::Recu,
        BagStatus::EnRemiseEnEtat,
        BagStatus::PretAVendre,
        BagStatus::EnVente,
        BagStatus::Vendu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BagStatus::EnCommande => "en_commande",
            BagStatus::EnTransit => "en_transit",
            BagStatus::Recu => "recu",
            BagStatus::EnRemiseEnEtat => "en_remise_en_etat",
            BagStatus::PretAVendre => "pret_a_vendre",
            BagStatus::EnVente => "en_vente",
            BagStatus::Vendu => "vendu",
        }
    }

    pub fn is_sold(&self) -> bool {
        *self == BagStatus::Vendu
    }
}

impl FromStr for BagStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BagStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::field("status", "Statut invalide"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "bag_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BagCondition {
    NeufEtiquette,
    NeufSansEtiquette,
    TresBon,
    Bon,
    Correct,
}

impl BagCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            BagCondition::NeufEtiquette => "neuf_etiquette",
            BagCondition::NeufSansEtiquette => "neuf_sans_etiquette",
            BagCondition::TresBon => "tres_bon",
            BagCondition::Bon => "bon",
            BagCondition::Correct => "correct",
        }
    }
}

/// Plataforma de compra ou de venda.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_platform", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Vinted,
    VestiaireCollectif,
    Leboncoin,
    Autre,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Vinted,
        Platform::VestiaireCollectif,
        Platform::Leboncoin,
        Platform::Autre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Vinted => "vinted",
            Platform::VestiaireCollectif => "vestiaire_collectif",
            Platform::Leboncoin => "leboncoin",
            Platform::Autre => "autre",
        }
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|platform| platform.as_str() == s)
            .ok_or_else(|| AppError::field("platform", "Plateforme invalide"))
    }
}

/// Referência legível: `MC-{ano}-{sequência com 5 dígitos}`.
pub fn format_reference(year: i32, sequence: i64) -> String {
    format!("MC-{}-{:05}", year, sequence)
}

// --- Entidade ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bag {
    pub id: Uuid,
    pub reference: String,
    pub brand: String,
    pub model: String,
    pub description: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub condition: BagCondition,

    pub purchase_date: NaiveDate,
    pub purchase_price: Decimal,
    pub purchase_platform: Platform,
    pub purchase_bank_account_id: Uuid,

    pub refurbishment_cost: Decimal,
    pub refurbishment_provider: Option<String>,
    pub refurbishment_notes: Option<String>,

    // Dados de venda "pré-preenchidos" no sac; a venda real fica em `sales`.
    pub sale_date: Option<NaiveDate>,
    pub sale_price: Option<Decimal>,
    pub sale_platform: Option<Platform>,
    pub sale_notes: Option<String>,

    pub photos: Vec<String>,
    pub status: BagStatus,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sac com os nomes das entidades relacionadas (conta e criador).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BagView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bag: Bag,
    pub purchase_bank_account_label: Option<String>,
    pub created_by_name: Option<String>,
}

/// Linha pronta para INSERT (a referência é gerada pelo repositório).
#[derive(Debug, Clone)]
pub struct NewBag {
    pub brand: String,
    pub model: String,
    pub description: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub condition: BagCondition,
    pub purchase_date: NaiveDate,
    pub purchase_price: Decimal,
    pub purchase_platform: Platform,
    pub purchase_bank_account_id: Uuid,
    pub refurbishment_cost: Decimal,
    pub refurbishment_provider: Option<String>,
    pub refurbishment_notes: Option<String>,
    pub sale_date: Option<NaiveDate>,
    pub sale_price: Option<Decimal>,
    pub sale_platform: Option<Platform>,
    pub sale_notes: Option<String>,
    pub photos: Vec<String>,
    pub status: BagStatus,
    pub created_by: Uuid,
}

// --- Payloads ---

fn default_status() -> BagStatus {
    BagStatus::EnCommande
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBagPayload {
    #[validate(length(min = 1, message = "Marque est requise"))]
    pub brand: String,
    #[validate(length(min = 1, message = "Modele est requis"))]
    pub model: String,
    #[validate(length(min = 1, message = "Description est requise"))]
    pub description: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub condition: BagCondition,

    #[serde(deserialize_with = "deserialize_date")]
    pub purchase_date: NaiveDate,
    #[validate(custom(function = "validate_price"))]
    pub purchase_price: Decimal,
    pub purchase_platform: Platform,
    pub purchase_bank_account_id: Uuid,

    #[validate(custom(function = "validate_price"))]
    #[serde(default)]
    pub refurbishment_cost: Decimal,
    pub refurbishment_provider: Option<String>,
    pub refurbishment_notes: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub sale_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_price"))]
    pub sale_price: Option<Decimal>,
    pub sale_platform: Option<Platform>,
    pub sale_notes: Option<String>,

    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default = "default_status")]
    pub status: BagStatus,
}

impl CreateBagPayload {
    pub fn into_new_bag(self, created_by: Uuid) -> NewBag {
        NewBag {
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            description: self.description.trim().to_string(),
            color: non_empty(self.color),
            size: non_empty(self.size),
            condition: self.condition,
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            purchase_platform: self.purchase_platform,
            purchase_bank_account_id: self.purchase_bank_account_id,
            refurbishment_cost: self.refurbishment_cost,
            refurbishment_provider: non_empty(self.refurbishment_provider),
            refurbishment_notes: non_empty(self.refurbishment_notes),
            sale_date: self.sale_date,
            sale_price: self.sale_price,
            sale_platform: self.sale_platform,
            sale_notes: non_empty(self.sale_notes),
            photos: self.photos,
            status: self.status,
            created_by,
        }
    }
}

/// Atualização parcial: campos ausentes não são alterados.
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBagPayload {
    #[validate(length(min = 1, message = "Marque est requise"))]
    pub brand: Option<String>,
    #[validate(length(min = 1, message = "Modele est requis"))]
    pub model: Option<String>,
    #[validate(length(min = 1, message = "Description est requise"))]
    pub description: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub condition: Option<BagCondition>,

    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub purchase_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_price"))]
    pub purchase_price: Option<Decimal>,
    pub purchase_platform: Option<Platform>,
    pub purchase_bank_account_id: Option<Uuid>,

    #[validate(custom(function = "validate_price"))]
    pub refurbishment_cost: Option<Decimal>,
    pub refurbishment_provider: Option<String>,
    pub refurbishment_notes: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub sale_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_price"))]
    pub sale_price: Option<Decimal>,
    pub sale_platform: Option<Platform>,
    pub sale_notes: Option<String>,

    pub photos: Option<Vec<String>>,
    pub status: Option<BagStatus>,
}

impl UpdateBagPayload {
    /// Algum dos campos que também existem na venda foi enviado?
    pub fn touches_sale_fields(&self) -> bool {
        self.sale_date.is_some()
            || self.sale_price.is_some()
            || self.sale_platform.is_some()
            || self.sale_notes.is_some()
    }

    /// Aplica o patch sobre uma cópia do sac (usado antes de persistir,
    /// para que a sincronização da venda veja o estado final).
    pub fn apply_to(&self, bag: &mut Bag) {
        if let Some(brand) = &self.brand {
            bag.brand = brand.trim().to_string();
        }
        if let Some(model) = &self.model {
            bag.model = model.trim().to_string();
        }
        if let Some(description) = &self.description {
            bag.description = description.trim().to_string();
        }
        if self.color.is_some() {
            bag.color = non_empty(self.color.clone());
        }
        if self.size.is_some() {
            bag.size = non_empty(self.size.clone());
        }
        if let Some(condition) = self.condition {
            bag.condition = condition;
        }
        if let Some(date) = self.purchase_date {
            bag.purchase_date = date;
        }
        if let Some(price) = self.purchase_price {
            bag.purchase_price = price;
        }
        if let Some(platform) = self.purchase_platform {
            bag.purchase_platform = platform;
        }
        if let Some(account) = self.purchase_bank_account_id {
            bag.purchase_bank_account_id = account;
        }
        if let Some(cost) = self.refurbishment_cost {
            bag.refurbishment_cost = cost;
        }
        if self.refurbishment_provider.is_some() {
            bag.refurbishment_provider = non_empty(self.refurbishment_provider.clone());
        }
        if self.refurbishment_notes.is_some() {
            bag.refurbishment_notes = non_empty(self.refurbishment_notes.clone());
        }
        if let Some(date) = self.sale_date {
            bag.sale_date = Some(date);
        }
        if let Some(price) = self.sale_price {
            bag.sale_price = Some(price);
        }
        if let Some(platform) = self.sale_platform {
            bag.sale_platform = Some(platform);
        }
        if self.sale_notes.is_some() {
            bag.sale_notes = non_empty(self.sale_notes.clone());
        }
        if let Some(photos) = &self.photos {
            bag.photos = photos.clone();
        }
        if let Some(status) = self.status {
            bag.status = status;
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// --- Listagem ---

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BagListQuery {
    /// Status exato, ou `all`
    pub status: Option<String>,
    /// Marca exata, ou `all`
    pub brand: Option<String>,
    /// Busca em referência, marca, modelo e descrição
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Filtros já interpretados para o repositório.
#[derive(Debug, Default, Clone)]
pub struct BagFilter {
    pub status: Option<BagStatus>,
    pub brand: Option<String>,
    pub search: Option<String>,
}

impl BagListQuery {
    pub fn filter(&self) -> Result<BagFilter, AppError> {
        let status = match active_filter(&self.status) {
            Some(raw) => Some(raw.parse::<BagStatus>()?),
            None => None,
        };
        Ok(BagFilter {
            status,
            brand: active_filter(&self.brand).map(str::to_string),
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

// "all" (ou vazio) desliga o filtro
fn active_filter(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BagListResponse {
    pub bags: Vec<BagView>,
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QrCodeQuery {
    /// `png` (padrão) ou `svg`
    pub format: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScanPayload {
    #[validate(length(min = 1, message = "Texte du QR code requis"))]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dec, sample_bag};
    use rstest::rstest;

    #[test]
    fn formats_reference_with_padding() {
        assert_eq!(format_reference(2025, 1), "MC-2025-00001");
        assert_eq!(format_reference(2026, 123456), "MC-2026-123456");
    }

    #[rstest]
    #[case("en_commande", BagStatus::EnCommande)]
    #[case("en_remise_en_etat", BagStatus::EnRemiseEnEtat)]
    #[case("pret_a_vendre", BagStatus::PretAVendre)]
    #[case("vendu", BagStatus::Vendu)]
    fn status_names_match_database_and_json(#[case] raw: &str, #[case] status: BagStatus) {
        assert_eq!(raw.parse::<BagStatus>().unwrap(), status);
        assert_eq!(serde_json::to_value(status).unwrap(), raw);
    }

    #[test]
    fn platform_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(Platform::VestiaireCollectif).unwrap(),
            "vestiaire_collectif"
        );
        assert!("ebay".parse::<Platform>().is_err());
    }

    #[test]
    fn create_payload_applies_defaults() {
        let payload: CreateBagPayload = serde_json::from_value(serde_json::json!({
            "brand": "Chanel",
            "model": "Timeless",
            "description": "Sac Chanel Timeless noir",
            "condition": "tres_bon",
            "purchaseDate": "15/01/2025",
            "purchasePrice": 850,
            "purchasePlatform": "vinted",
            "purchaseBankAccountId": Uuid::nil(),
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.status, BagStatus::EnCommande);
        assert_eq!(payload.refurbishment_cost, Decimal::ZERO);
        assert!(payload.photos.is_empty());
        assert_eq!(payload.purchase_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn create_payload_rejects_negative_price() {
        let payload: CreateBagPayload = serde_json::from_value(serde_json::json!({
            "brand": "Chanel",
            "model": "Timeless",
            "description": "Sac",
            "condition": "bon",
            "purchaseDate": "2025-01-15",
            "purchasePrice": -5,
            "purchasePlatform": "autre",
            "purchaseBankAccountId": Uuid::nil(),
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let message = crate::common::error::AppError::from(errors).to_string();
        assert_eq!(message, "Le prix ne peut pas etre negatif");
    }

    #[test]
    fn apply_to_only_changes_sent_fields() {
        let mut bag = sample_bag(BagStatus::EnVente);
        let patch = UpdateBagPayload {
            refurbishment_cost: Some(dec("35")),
            color: Some("  ".into()),
            status: Some(BagStatus::Vendu),
            ..Default::default()
        };

        patch.apply_to(&mut bag);

        assert_eq!(bag.refurbishment_cost, dec("35"));
        assert_eq!(bag.color, None);
        assert_eq!(bag.status, BagStatus::Vendu);
        assert_eq!(bag.brand, "Louis Vuitton");
        assert!(!patch.touches_sale_fields());
    }

    #[test]
    fn list_query_ignores_all_and_blank_filters() {
        let query = BagListQuery {
            status: Some("all".into()),
            brand: Some("Chanel".into()),
            search: Some("   ".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.brand.as_deref(), Some("Chanel"));
        assert_eq!(filter.search, None);

        let invalid = BagListQuery { status: Some("perdu".into()), ..Default::default() };
        assert!(invalid.filter().is_err());
    }
}
