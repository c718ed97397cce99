// src/services/spreadsheet.rs
//
// Leitura das planilhas de importação (xlsx/xls/ods) com calamine,
// convertidas para uma forma neutra: cabeçalhos minúsculos -> células.

use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::common::{
    dates::{parse_flexible_date, spreadsheet_number_to_date},
    error::AppError,
    validation::MAX_AMOUNT,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(trimmed.to_string())
                }
            }
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::Error(_) | Data::Empty => Cell::Empty,
        }
    }
}

/// Uma linha de dados; `line` é o número da linha na planilha.
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    pub line: usize,
    cells: HashMap<String, Cell>,
}

impl SheetRow {
    pub fn new(line: usize, cells: impl IntoIterator<Item = (String, Cell)>) -> Self {
        Self {
            line,
            cells: cells
                .into_iter()
                .map(|(header, cell)| (normalize_header(&header), cell))
                .collect(),
        }
    }

    // Primeiro cabeçalho (entre os sinônimos) com valor preenchido
    fn first(&self, keys: &[&str]) -> Option<&Cell> {
        keys.iter()
            .filter_map(|key| self.cells.get(*key))
            .find(|cell| **cell != Cell::Empty)
    }

    pub fn text(&self, keys: &[&str]) -> Option<String> {
        match self.first(keys)? {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Empty => None,
        }
    }

    /// Aceita números nativos e texto com vírgula decimal ("12,50 €").
    /// Valores acima de `MAX_AMOUNT` contam como ausentes.
    pub fn amount(&self, keys: &[&str]) -> Option<Decimal> {
        let value = match self.first(keys)? {
            Cell::Number(n) => Decimal::try_from(*n).ok().map(|d| d.round_dp(2)),
            Cell::Text(s) => parse_amount(s),
            Cell::Empty => None,
        };
        value.filter(|d| *d <= MAX_AMOUNT)
    }

    pub fn date(&self, keys: &[&str]) -> Option<NaiveDate> {
        match self.first(keys)? {
            Cell::Number(n) => spreadsheet_number_to_date(*n),
            Cell::Text(s) => parse_flexible_date(s),
            Cell::Empty => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<SheetRow>,
}

fn normalize_header(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&cleaned).ok()
}

/// Lê todas as abas; a primeira linha de cada uma é o cabeçalho.
pub fn read_workbook(bytes: Vec<u8>) -> Result<Vec<Sheet>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::business(format!("Fichier Excel illisible: {}", e)))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| AppError::business(format!("Onglet {} illisible: {}", name, e)))?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            sheets.push(Sheet { name, rows: Vec::new() });
            continue;
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| match Cell::from(cell) {
                Cell::Text(s) => s,
                Cell::Number(n) => n.to_string(),
                Cell::Empty => String::new(),
            })
            .collect();

        // Linha 1 = cabeçalho; os dados começam na linha 2
        let data_rows = rows
            .enumerate()
            .map(|(index, cells)| {
                SheetRow::new(
                    index + 2,
                    headers
                        .iter()
                        .zip(cells.iter())
                        .filter(|(header, _)| !header.is_empty())
                        .map(|(header, cell)| (header.clone(), Cell::from(cell))),
                )
            })
            .collect();

        sheets.push(Sheet { name, rows: data_rows });
    }

    Ok(sheets)
}

// --- Tipos de aba ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetKind {
    /// Compras: só cria sacs
    Purchases,
    /// Aba de um vendedor: sac + venda, na conta do vendedor
    Seller(String),
    /// Histórico antigo: sac + venda, conta padrão
    History,
    Ignored,
}

pub fn classify_sheet(name: &str, seller_sheets: &[String]) -> SheetKind {
    let lower = name.trim().to_lowercase();
    match lower.as_str() {
        "achats" => SheetKind::Purchases,
        "historique" => SheetKind::History,
        _ if seller_sheets.iter().any(|s| s.to_lowercase() == lower) => SheetKind::Seller(lower),
        _ => SheetKind::Ignored,
    }
}

// --- Linhas interpretadas ---

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRow {
    pub line: usize,
    pub description: String,
    pub price: Decimal,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoldRow {
    pub line: usize,
    pub description: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub fees: Decimal,
    pub date: Option<NaiveDate>,
}

/// `None` quando a linha deve ser ignorada (sem descrição ou sem preço).
pub fn read_purchase_row(row: &SheetRow) -> Option<PurchaseRow> {
    let description = row.text(&["descriptif"])?;
    let price = row.amount(&["prix"]).filter(|p| *p > Decimal::ZERO)?;
    Some(PurchaseRow {
        line: row.line,
        description,
        price,
        date: row.date(&["date"]),
    })
}

pub fn read_seller_row(row: &SheetRow) -> Option<SoldRow> {
    let description = row.text(&["descriptif"])?;
    let sale_price = row.amount(&["prix vente"]).filter(|p| *p > Decimal::ZERO)?;
    Some(SoldRow {
        line: row.line,
        description,
        purchase_price: non_negative(row.amount(&["prix achat"])),
        sale_price,
        fees: non_negative(row.amount(&["frais gianni", "frais"])),
        date: row.date(&["date"]),
    })
}

pub fn read_history_row(row: &SheetRow) -> Option<SoldRow> {
    let description = row.text(&["achats libelle", "descriptif"])?;
    let sale_price = row.amount(&["prix vente"]).filter(|p| *p > Decimal::ZERO)?;
    Some(SoldRow {
        line: row.line,
        description,
        purchase_price: non_negative(row.amount(&["prix achats", "prix achat"])),
        sale_price,
        fees: Decimal::ZERO,
        date: row.date(&["date"]),
    })
}

fn non_negative(value: Option<Decimal>) -> Decimal {
    value.filter(|v| *v > Decimal::ZERO).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dec, ymd};

    fn row(line: usize, cells: &[(&str, Cell)]) -> SheetRow {
        SheetRow::new(line, cells.iter().map(|(h, c)| (h.to_string(), c.clone())))
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    #[test]
    fn classifies_sheets_case_insensitively() {
        let sellers = vec!["beatrice".to_string(), "tiziana".to_string()];
        assert_eq!(classify_sheet("ACHATS", &sellers), SheetKind::Purchases);
        assert_eq!(classify_sheet("Historique", &sellers), SheetKind::History);
        assert_eq!(classify_sheet("Tiziana", &sellers), SheetKind::Seller("tiziana".into()));
        assert_eq!(classify_sheet("Feuil1", &sellers), SheetKind::Ignored);
    }

    #[test]
    fn headers_are_matched_case_insensitively() {
        let r = row(2, &[("  Prix   Achat ", Cell::Number(120.0)), ("DESCRIPTIF", text("Sac Lancel"))]);
        assert_eq!(r.amount(&["prix achat"]), Some(dec("120")));
        assert_eq!(r.text(&["descriptif"]).as_deref(), Some("Sac Lancel"));
    }

    #[test]
    fn amounts_accept_comma_decimals() {
        let r = row(2, &[("prix", text("12,50 €"))]);
        assert_eq!(r.amount(&["prix"]), Some(dec("12.50")));
        let bad = row(2, &[("prix", text("gratuit"))]);
        assert_eq!(bad.amount(&["prix"]), None);
    }

    #[test]
    fn amounts_beyond_column_precision_are_ignored() {
        let huge = row(2, &[("prix", text("70000000000000000000000000000"))]);
        assert_eq!(huge.amount(&["prix"]), None);
        let huge_number = row(2, &[("prix", Cell::Number(1e15))]);
        assert_eq!(huge_number.amount(&["prix"]), None);
        let max = row(2, &[("prix", text("9999999999,99"))]);
        assert_eq!(max.amount(&["prix"]), Some(dec("9999999999.99")));
    }

    #[test]
    fn dates_accept_serials_compact_numbers_and_text() {
        let serial = row(2, &[("date", Cell::Number(45658.0))]);
        assert_eq!(serial.date(&["date"]), Some(ymd(2025, 1, 1)));
        let compact = row(2, &[("date", Cell::Number(270524.0))]);
        assert_eq!(compact.date(&["date"]), Some(ymd(2024, 5, 27)));
        let textual = row(2, &[("date", text("03/02/2025"))]);
        assert_eq!(textual.date(&["date"]), Some(ymd(2025, 2, 3)));
    }

    #[test]
    fn purchase_rows_without_price_are_skipped() {
        let ok = row(3, &[("descriptif", text("Sac Longchamp")), ("prix", Cell::Number(45.0))]);
        let parsed = read_purchase_row(&ok).unwrap();
        assert_eq!(parsed.line, 3);
        assert_eq!(parsed.price, dec("45"));
        assert_eq!(parsed.date, None);

        let zero = row(4, &[("descriptif", text("Sac Longchamp")), ("prix", Cell::Number(0.0))]);
        assert!(read_purchase_row(&zero).is_none());
        let empty = row(5, &[("descriptif", Cell::Empty), ("prix", Cell::Number(10.0))]);
        assert!(read_purchase_row(&empty).is_none());
    }

    #[test]
    fn seller_rows_fall_back_to_generic_fee_column() {
        let r = row(
            2,
            &[
                ("descriptif", text("Chanel Timeless")),
                ("prix achat", Cell::Number(800.0)),
                ("prix vente", text("1200")),
                ("frais", Cell::Number(35.5)),
            ],
        );
        let parsed = read_seller_row(&r).unwrap();
        assert_eq!(parsed.purchase_price, dec("800"));
        assert_eq!(parsed.sale_price, dec("1200"));
        assert_eq!(parsed.fees, dec("35.5"));
    }

    #[test]
    fn history_rows_use_legacy_headers() {
        let r = row(
            9,
            &[
                ("achats libelle", text("Sac Hermes Evelyne")),
                ("prix achats", Cell::Number(900.0)),
                ("prix vente", Cell::Number(1400.0)),
                ("date", text("2024-06-01")),
            ],
        );
        let parsed = read_history_row(&r).unwrap();
        assert_eq!(parsed.description, "Sac Hermes Evelyne");
        assert_eq!(parsed.fees, Decimal::ZERO);
        assert_eq!(parsed.date, Some(ymd(2024, 6, 1)));
    }

    #[test]
    fn unreadable_workbook_is_a_business_error() {
        let err = read_workbook(b"definitely not a spreadsheet".to_vec()).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
