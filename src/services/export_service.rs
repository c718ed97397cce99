// src/services/export_service.rs

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    common::{dates::format_fr, error::AppError},
    db::{BagRepository, SaleRepository},
    models::{bag::BagView, export::ExportKind, sale::SaleView},
};

const SALES_HEADERS: [&str; 14] = [
    "Date",
    "Reference",
    "Marque",
    "Modele",
    "Prix achat",
    "Frais remise en etat",
    "Prix vente",
    "Frais plateforme",
    "Frais expedition",
    "Marge",
    "Marge %",
    "Plateforme",
    "Compte bancaire",
    "Vendeur",
];

const STOCK_HEADERS: [&str; 15] = [
    "Reference",
    "Marque",
    "Modele",
    "Description",
    "Couleur",
    "Taille",
    "Etat",
    "Date achat",
    "Prix achat",
    "Plateforme achat",
    "Frais remise en etat",
    "Prestataire",
    "Statut",
    "Compte bancaire",
    "Cree par",
];

/// Arquivo pronto para download.
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Clone)]
pub struct ExportService {
    bag_repo: BagRepository,
    sale_repo: SaleRepository,
}

impl ExportService {
    pub fn new(bag_repo: BagRepository, sale_repo: SaleRepository) -> Self {
        Self { bag_repo, sale_repo }
    }

    pub async fn export(&self, kind: ExportKind, today: NaiveDate) -> Result<CsvExport, AppError> {
        let content = match kind {
            ExportKind::Sales => sales_csv(&self.sale_repo.list_for_export().await?)?,
            ExportKind::Stock => stock_csv(&self.bag_repo.list_for_export().await?)?,
        };
        Ok(CsvExport {
            filename: export_filename(kind, today),
            content,
        })
    }
}

pub fn export_filename(kind: ExportKind, today: NaiveDate) -> String {
    let prefix = match kind {
        ExportKind::Sales => "ventes_export",
        ExportKind::Stock => "stock_export",
    };
    format!("{}_{}.csv", prefix, today.format("%Y-%m-%d"))
}

// Separador ";" (Excel francês), aspas apenas quando necessário
fn writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .delimiter(b';')
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, AppError> {
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Falha ao finalizar CSV: {}", e).into())
}

fn amount(value: Decimal) -> String {
    value.normalize().to_string()
}

// "54.2%" (uma casa, arredondada)
fn percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.1}%", rounded)
}

fn opt_amount(value: Option<Decimal>) -> String {
    amount(value.unwrap_or(Decimal::ZERO))
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn sales_csv(sales: &[SaleView]) -> Result<Vec<u8>, AppError> {
    let mut wtr = writer();
    wtr.write_record(SALES_HEADERS).map_err(anyhow::Error::from)?;

    for view in sales {
        let sale = &view.sale;
        wtr.write_record([
            format_fr(sale.sale_date),
            text(&view.bag_reference),
            text(&view.bag_brand),
            text(&view.bag_model),
            opt_amount(view.bag_purchase_price),
            opt_amount(view.bag_refurbishment_cost),
            amount(sale.sale_price),
            amount(sale.platform_fees),
            amount(sale.shipping_cost),
            amount(sale.margin),
            percent(sale.margin_percent),
            sale.sale_platform.as_str().to_string(),
            text(&view.bank_account_label),
            text(&view.sold_by_name),
        ])
        .map_err(anyhow::Error::from)?;
    }

    finish(wtr)
}

pub fn stock_csv(bags: &[BagView]) -> Result<Vec<u8>, AppError> {
    let mut wtr = writer();
    wtr.write_record(STOCK_HEADERS).map_err(anyhow::Error::from)?;

    for view in bags {
        let bag = &view.bag;
        wtr.write_record([
            bag.reference.clone(),
            bag.brand.clone(),
            bag.model.clone(),
            bag.description.clone(),
            text(&bag.color),
            text(&bag.size),
            bag.condition.as_str().to_string(),
            format_fr(bag.purchase_date),
            amount(bag.purchase_price),
            bag.purchase_platform.as_str().to_string(),
            amount(bag.refurbishment_cost),
            text(&bag.refurbishment_provider),
            bag.status.as_str().to_string(),
            text(&view.purchase_bank_account_label),
            text(&view.created_by_name),
        ])
        .map_err(anyhow::Error::from)?;
    }

    finish(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bag::BagStatus;
    use crate::test_support::{sample_bag, sample_sale, ymd};

    fn lines(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn sales_export_uses_french_formats() {
        let bag = sample_bag(BagStatus::Vendu);
        let view = SaleView {
            sale: sample_sale(&bag),
            bag_reference: Some(bag.reference.clone()),
            bag_brand: Some(bag.brand.clone()),
            bag_model: Some(bag.model.clone()),
            bag_photos: Some(vec![]),
            bag_purchase_price: Some(bag.purchase_price),
            bag_refurbishment_cost: Some(bag.refurbishment_cost),
            bag_condition: Some(bag.condition),
            bank_account_label: Some("Beatrice".into()),
            sold_by_name: Some("Nadia".into()),
        };

        let rows = lines(sales_csv(&[view]).unwrap());
        assert_eq!(rows[0], SALES_HEADERS.join(";"));
        assert_eq!(
            rows[1],
            "01/02/2025;MC-2025-00001;Louis Vuitton;Neverfull;100;20;200;10;5;65;54.2%;vinted;Beatrice;Nadia"
        );
    }

    #[test]
    fn stock_export_quotes_only_when_needed() {
        let mut bag = sample_bag(BagStatus::EnVente);
        bag.description = "Sac \"vintage\"; tres propre".into();
        let view = BagView {
            bag,
            purchase_bank_account_label: None,
            created_by_name: Some("Nadia".into()),
        };

        let rows = lines(stock_csv(&[view]).unwrap());
        assert_eq!(rows.len(), 2);
        assert!(rows[1].starts_with("MC-2025-00001;Louis Vuitton;Neverfull;\"Sac \"\"vintage\"\"; tres propre\";"));
        assert!(rows[1].ends_with(";en_vente;;Nadia"));
        assert!(rows[1].contains(";tres_bon;10/01/2025;100;vinted;20;Gianni;"));
    }

    #[test]
    fn filenames_carry_the_date() {
        assert_eq!(export_filename(ExportKind::Sales, ymd(2025, 3, 9)), "ventes_export_2025-03-09.csv");
        assert_eq!(export_filename(ExportKind::Stock, ymd(2025, 3, 9)), "stock_export_2025-03-09.csv");
    }
}
