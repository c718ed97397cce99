// src/models/import.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Resultado de uma importação: nunca aborta, acumula os erros por linha.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub bags_created: u32,
    pub sales_created: u32,
    pub bank_accounts_created: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}

impl Default for ImportResult {
    fn default() -> Self {
        Self {
            success: true,
            bags_created: 0,
            sales_created: 0,
            bank_accounts_created: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }
}

impl ImportResult {
    /// `row` é o número da linha na planilha (o cabeçalho é a linha 1).
    pub fn row_error(&mut self, row: usize, sheet: &str, message: impl std::fmt::Display) {
        self.errors.push(format!("Ligne {} ({}): {}", row, sheet, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_errors_name_line_and_sheet() {
        let mut result = ImportResult::default();
        result.row_error(7, "tiziana", "Prix de vente invalide");
        assert_eq!(result.errors, vec!["Ligne 7 (tiziana): Prix de vente invalide"]);
        assert!(result.success);
    }

    #[test]
    fn serializes_flat_counters() {
        let json = serde_json::to_value(ImportResult::default()).unwrap();
        assert_eq!(json["bagsCreated"], 0);
        assert_eq!(json["bankAccountsCreated"], 0);
        assert_eq!(json["success"], true);
    }
}
