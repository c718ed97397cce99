// src/models/export.rs

use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Sales,
    Stock,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `sales` (padrão) ou `stock`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Apenas `csv`
    pub format: Option<String>,
}

impl ExportQuery {
    pub fn kind(&self) -> Result<ExportKind, AppError> {
        match self.kind.as_deref().unwrap_or("sales") {
            "sales" => Ok(ExportKind::Sales),
            "stock" => Ok(ExportKind::Stock),
            _ => Err(AppError::business("Type invalide")),
        }
    }

    pub fn ensure_csv(&self) -> Result<(), AppError> {
        match self.format.as_deref().unwrap_or("csv") {
            "csv" => Ok(()),
            _ => Err(AppError::business("Format non supporte")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_sales_csv() {
        let query = ExportQuery::default();
        assert_eq!(query.kind().unwrap(), ExportKind::Sales);
        assert!(query.ensure_csv().is_ok());
    }

    #[test]
    fn rejects_unknown_type_and_format() {
        let query = ExportQuery { kind: Some("clients".into()), format: Some("xlsx".into()) };
        assert_eq!(query.kind().unwrap_err().to_string(), "Type invalide");
        assert_eq!(query.ensure_csv().unwrap_err().to_string(), "Format non supporte");
    }
}
