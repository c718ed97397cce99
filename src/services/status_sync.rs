// src/services/status_sync.rs
//
// Decide o que acontece com a venda quando um sac é criado ou alterado.
// Funções puras: o service executa o plano dentro da transação.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        bag::{Bag, UpdateBagPayload},
        sale::{NewSale, Sale, SaleChanges},
    },
    services::margin::compute_margin,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SaleSync {
    Nothing,
    Create(NewSale),
    Delete(Uuid),
    Patch(Uuid, SaleChanges),
}

/// Venda gerada a partir dos campos de venda do próprio sac: sem taxas,
/// recebida na conta de compra, vendedor = quem fez a alteração.
pub fn sale_from_bag(bag: &Bag, seller: Uuid, today: NaiveDate) -> Result<NewSale, AppError> {
    let sale_price = bag
        .sale_price
        .ok_or_else(|| AppError::field("salePrice", "Le prix de vente est requis pour un sac vendu"))?;
    let sale_platform = bag.sale_platform.ok_or_else(|| {
        AppError::field("salePlatform", "La plateforme de vente est requise pour un sac vendu")
    })?;

    let margin = compute_margin(
        sale_price,
        bag.purchase_price,
        bag.refurbishment_cost,
        Default::default(),
        Default::default(),
    )?;

    Ok(NewSale {
        bag_id: bag.id,
        sale_date: bag.sale_date.unwrap_or(today),
        sale_price,
        sale_platform,
        platform_fees: Default::default(),
        shipping_cost: Default::default(),
        bank_account_id: bag.purchase_bank_account_id,
        margin: margin.amount,
        margin_percent: margin.percent,
        notes: bag.sale_notes.clone(),
        sold_by: seller,
    })
}

/// `before` é o sac gravado, `after` o sac com o patch já aplicado.
pub fn plan_sale_sync(
    before: &Bag,
    after: &Bag,
    patch: &UpdateBagPayload,
    existing: Option<&Sale>,
    seller: Uuid,
    today: NaiveDate,
) -> Result<SaleSync, AppError> {
    let was_sold = before.status.is_sold();
    let is_sold = after.status.is_sold();

    match (was_sold, is_sold, existing) {
        // Passou a vendido: cria a venda se ainda não houver uma
        (false, true, Some(_)) => Ok(SaleSync::Nothing),
        (false, true, None) => sale_from_bag(after, seller, today).map(SaleSync::Create),

        // Saiu de vendido: a venda deixa de existir
        (true, false, Some(sale)) => Ok(SaleSync::Delete(sale.id)),
        (true, false, None) => Ok(SaleSync::Nothing),

        // Continua vendido: repassa as alterações de venda
        (true, true, Some(sale)) if patch.touches_sale_fields() => {
            let margin = match patch.sale_price {
                Some(price) => {
                    let m = compute_margin(
                        price,
                        after.purchase_price,
                        after.refurbishment_cost,
                        sale.platform_fees,
                        sale.shipping_cost,
                    )?;
                    Some((m.amount, m.percent))
                }
                None => None,
            };
            Ok(SaleSync::Patch(
                sale.id,
                SaleChanges {
                    sale_date: patch.sale_date,
                    sale_price: patch.sale_price,
                    sale_platform: patch.sale_platform,
                    notes: patch.sale_notes.clone(),
                    margin,
                    ..Default::default()
                },
            ))
        }
        // Vendido sem venda registrada (dados antigos): cria se possível
        (true, true, None) if after.sale_price.is_some() && after.sale_platform.is_some() => {
            sale_from_bag(after, seller, today).map(SaleSync::Create)
        }
        _ => Ok(SaleSync::Nothing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bag::{BagStatus, Platform};
    use crate::test_support::{dec, sample_bag, sample_sale, ymd};

    fn merged(before: &Bag, patch: &UpdateBagPayload) -> Bag {
        let mut after = before.clone();
        patch.apply_to(&mut after);
        after
    }

    #[test]
    fn marking_as_sold_without_price_is_rejected() {
        let before = sample_bag(BagStatus::EnVente);
        let patch = UpdateBagPayload { status: Some(BagStatus::Vendu), ..Default::default() };
        let after = merged(&before, &patch);

        let err = plan_sale_sync(&before, &after, &patch, None, Uuid::nil(), ymd(2025, 3, 1)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Le prix de vente est requis pour un sac vendu");
    }

    #[test]
    fn marking_as_sold_creates_sale_with_defaults() {
        let before = sample_bag(BagStatus::EnVente);
        let seller = Uuid::new_v4();
        let patch = UpdateBagPayload {
            status: Some(BagStatus::Vendu),
            sale_price: Some(dec("200")),
            sale_platform: Some(Platform::Vinted),
            ..Default::default()
        };
        let after = merged(&before, &patch);

        let plan = plan_sale_sync(&before, &after, &patch, None, seller, ymd(2025, 3, 1)).unwrap();
        let SaleSync::Create(sale) = plan else {
            panic!("expected a sale to be created, got {:?}", plan);
        };
        assert_eq!(sale.sale_date, ymd(2025, 3, 1));
        assert_eq!(sale.bank_account_id, before.purchase_bank_account_id);
        assert_eq!(sale.sold_by, seller);
        assert_eq!(sale.platform_fees, dec("0"));
        assert_eq!(sale.margin, dec("80"));
        assert_eq!(sale.margin_percent, dec("66.67"));
    }

    #[test]
    fn stored_sale_fields_are_enough_to_mark_as_sold() {
        let mut before = sample_bag(BagStatus::PretAVendre);
        before.sale_price = Some(dec("150"));
        before.sale_platform = Some(Platform::Leboncoin);
        before.sale_date = Some(ymd(2025, 2, 20));
        let patch = UpdateBagPayload { status: Some(BagStatus::Vendu), ..Default::default() };
        let after = merged(&before, &patch);

        let plan = plan_sale_sync(&before, &after, &patch, None, Uuid::nil(), ymd(2025, 3, 1)).unwrap();
        assert!(matches!(plan, SaleSync::Create(ref s) if s.sale_date == ymd(2025, 2, 20)));
    }

    #[test]
    fn existing_sale_is_not_duplicated() {
        let before = sample_bag(BagStatus::EnVente);
        let sale = sample_sale(&before);
        let patch = UpdateBagPayload {
            status: Some(BagStatus::Vendu),
            sale_price: Some(dec("200")),
            sale_platform: Some(Platform::Vinted),
            ..Default::default()
        };
        let after = merged(&before, &patch);

        let plan = plan_sale_sync(&before, &after, &patch, Some(&sale), Uuid::nil(), ymd(2025, 3, 1)).unwrap();
        assert_eq!(plan, SaleSync::Nothing);
    }

    #[test]
    fn overflowing_cost_when_marking_as_sold_is_a_business_error() {
        let before = sample_bag(BagStatus::EnVente);
        let patch = UpdateBagPayload {
            status: Some(BagStatus::Vendu),
            purchase_price: Some(dec("70000000000000000000000000000")),
            refurbishment_cost: Some(dec("70000000000000000000000000000")),
            sale_price: Some(dec("200")),
            sale_platform: Some(Platform::Vinted),
            ..Default::default()
        };
        let after = merged(&before, &patch);

        let err = plan_sale_sync(&before, &after, &patch, None, Uuid::nil(), ymd(2025, 3, 1)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        // O handler já recusa esses valores na validação
        use validator::Validate;
        let errors = patch.validate().unwrap_err();
        let messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter().filter_map(|e| e.message.as_ref().map(|m| m.to_string())))
            .collect();
        assert!(messages.iter().any(|m| m == "Le prix est trop eleve"));
    }

    #[test]
    fn leaving_sold_deletes_the_sale() {
        let before = sample_bag(BagStatus::Vendu);
        let sale = sample_sale(&before);
        let patch = UpdateBagPayload { status: Some(BagStatus::EnTransit), ..Default::default() };
        let after = merged(&before, &patch);

        let plan = plan_sale_sync(&before, &after, &patch, Some(&sale), Uuid::nil(), ymd(2025, 3, 1)).unwrap();
        assert_eq!(plan, SaleSync::Delete(sale.id));
    }

    #[test]
    fn price_change_on_sold_bag_recomputes_margin_with_new_costs() {
        let before = sample_bag(BagStatus::Vendu);
        let sale = sample_sale(&before);
        let patch = UpdateBagPayload {
            sale_price: Some(dec("250")),
            refurbishment_cost: Some(dec("30")),
            ..Default::default()
        };
        let after = merged(&before, &patch);

        let plan = plan_sale_sync(&before, &after, &patch, Some(&sale), Uuid::nil(), ymd(2025, 3, 1)).unwrap();
        let SaleSync::Patch(id, changes) = plan else {
            panic!("expected a patch, got {:?}", plan);
        };
        assert_eq!(id, sale.id);
        assert_eq!(changes.sale_price, Some(dec("250")));
        // 250 - 130 - 15 = 105 ; 105 / 130
        assert_eq!(changes.margin, Some((dec("105"), dec("80.77"))));
    }

    #[test]
    fn notes_only_change_keeps_margin() {
        let before = sample_bag(BagStatus::Vendu);
        let sale = sample_sale(&before);
        let patch = UpdateBagPayload { sale_notes: Some("Envoye en relais".into()), ..Default::default() };
        let after = merged(&before, &patch);

        let plan = plan_sale_sync(&before, &after, &patch, Some(&sale), Uuid::nil(), ymd(2025, 3, 1)).unwrap();
        let SaleSync::Patch(_, changes) = plan else {
            panic!("expected a patch, got {:?}", plan);
        };
        assert_eq!(changes.margin, None);
        assert_eq!(changes.notes.as_deref(), Some("Envoye en relais"));
    }

    #[test]
    fn unrelated_update_does_nothing() {
        let before = sample_bag(BagStatus::Recu);
        let patch = UpdateBagPayload { color: Some("Noir".into()), ..Default::default() };
        let after = merged(&before, &patch);

        let plan = plan_sale_sync(&before, &after, &patch, None, Uuid::nil(), ymd(2025, 3, 1)).unwrap();
        assert_eq!(plan, SaleSync::Nothing);
    }
}
