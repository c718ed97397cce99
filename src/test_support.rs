// src/test_support.rs
// Fixtures compartilhadas pelos testes unitários.

use std::str::FromStr;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    auth::{User, UserRole},
    bag::{Bag, BagCondition, BagStatus, Platform},
    sale::Sale,
};

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_user(role: UserRole) -> User {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    User {
        id: Uuid::new_v4(),
        email: "nadia@moncoeur.app".into(),
        password_hash: "$2b$12$abcdefghijklmnopqrstuv".into(),
        name: "Nadia".into(),
        role,
        is_active: true,
        created_at: at,
        updated_at: at,
    }
}

/// Louis Vuitton comprado por 100, reforma de 20.
pub fn sample_bag(status: BagStatus) -> Bag {
    let at = Utc.with_ymd_and_hms(2025, 1, 10, 14, 30, 0).unwrap();
    Bag {
        id: Uuid::new_v4(),
        reference: "MC-2025-00001".into(),
        brand: "Louis Vuitton".into(),
        model: "Neverfull".into(),
        description: "Sac Louis Vuitton Neverfull".into(),
        color: Some("Marron".into()),
        size: Some("MM".into()),
        condition: BagCondition::TresBon,
        purchase_date: ymd(2025, 1, 10),
        purchase_price: dec("100"),
        purchase_platform: Platform::Vinted,
        purchase_bank_account_id: Uuid::new_v4(),
        refurbishment_cost: dec("20"),
        refurbishment_provider: Some("Gianni".into()),
        refurbishment_notes: None,
        sale_date: None,
        sale_price: None,
        sale_platform: None,
        sale_notes: None,
        photos: vec![],
        status,
        created_by: Uuid::new_v4(),
        created_at: at,
        updated_at: at,
    }
}

pub fn sample_sale(bag: &Bag) -> Sale {
    let at = Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap();
    Sale {
        id: Uuid::new_v4(),
        bag_id: bag.id,
        sale_date: ymd(2025, 2, 1),
        sale_price: dec("200"),
        sale_platform: Platform::Vinted,
        platform_fees: dec("10"),
        shipping_cost: dec("5"),
        bank_account_id: bag.purchase_bank_account_id,
        margin: dec("65"),
        margin_percent: dec("54.17"),
        notes: None,
        sold_by: bag.created_by,
        created_at: at,
        updated_at: at,
    }
}
