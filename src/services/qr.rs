// src/services/qr.rs

use image::{DynamicImage, ImageOutputFormat, Luma};
use qrcode::{render::svg, QrCode};
use uuid::Uuid;

use crate::common::error::AppError;

const MIN_SIZE: u32 = 300;

/// Formato da imagem devolvida por `/bags/{id}/qrcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrFormat {
    Png,
    Svg,
}

impl QrFormat {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim).map(str::to_lowercase).as_deref() {
            None | Some("") | Some("png") => Ok(QrFormat::Png),
            Some("svg") => Ok(QrFormat::Svg),
            Some(_) => Err(AppError::business("Format non supporte")),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            QrFormat::Png => "image/png",
            QrFormat::Svg => "image/svg+xml",
        }
    }
}

/// Página do sac no front: é isso que a etiqueta codifica.
pub fn bag_url(public_base_url: &str, bag_id: Uuid) -> String {
    format!("{}/stock/{}", public_base_url.trim_end_matches('/'), bag_id)
}

pub fn render(content: &str, format: QrFormat) -> Result<Vec<u8>, AppError> {
    let code = QrCode::new(content.as_bytes())
        .map_err(|e| anyhow::anyhow!("Falha ao gerar QR code: {:?}", e))?;

    match format {
        QrFormat::Png => {
            let image = code
                .render::<Luma<u8>>()
                .min_dimensions(MIN_SIZE, MIN_SIZE)
                .build();
            let mut bytes = Vec::new();
            DynamicImage::ImageLuma8(image)
                .write_to(&mut bytes, ImageOutputFormat::Png)
                .map_err(|e| anyhow::anyhow!("Falha ao codificar PNG: {}", e))?;
            Ok(bytes)
        }
        QrFormat::Svg => Ok(code
            .render::<svg::Color>()
            .min_dimensions(MIN_SIZE, MIN_SIZE)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build()
            .into_bytes()),
    }
}

/// O que um texto lido pela câmera aponta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    Id(Uuid),
    Reference(String),
}

/// Aceita a URL `/stock/{id}`, o id puro ou a referência `MC-AAAA-NNNNN`.
pub fn resolve_scanned_code(text: &str) -> Result<ScanTarget, AppError> {
    let text = text.trim();

    if let Some((_, rest)) = text.split_once("/stock/") {
        let segment = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        return Uuid::parse_str(segment)
            .map(ScanTarget::Id)
            .map_err(|_| unrecognized());
    }

    if let Ok(id) = Uuid::parse_str(text) {
        return Ok(ScanTarget::Id(id));
    }

    if looks_like_reference(text) {
        return Ok(ScanTarget::Reference(text.to_uppercase()));
    }

    Err(unrecognized())
}

fn unrecognized() -> AppError {
    AppError::business("QR code non reconnu")
}

fn looks_like_reference(text: &str) -> bool {
    let mut parts = text.split('-');
    let (Some(prefix), Some(year), Some(seq), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix.eq_ignore_ascii_case("MC")
        && year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && !seq.is_empty()
        && seq.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ID: &str = "6f1c7d2e-8a4b-4c3d-9e2f-0a1b2c3d4e5f";

    #[test]
    fn builds_bag_url_without_double_slash() {
        let id = Uuid::parse_str(ID).unwrap();
        assert_eq!(
            bag_url("https://moncoeur.app/", id),
            format!("https://moncoeur.app/stock/{}", ID)
        );
    }

    #[rstest]
    #[case(format!("https://moncoeur.app/stock/{}", ID))]
    #[case(format!("http://localhost:3000/stock/{}?from=label", ID))]
    #[case(format!("  {}  ", ID))]
    fn resolves_ids(#[case] text: String) {
        assert_eq!(
            resolve_scanned_code(&text).unwrap(),
            ScanTarget::Id(Uuid::parse_str(ID).unwrap())
        );
    }

    #[test]
    fn resolves_references() {
        assert_eq!(
            resolve_scanned_code("mc-2025-00042").unwrap(),
            ScanTarget::Reference("MC-2025-00042".into())
        );
    }

    #[rstest]
    #[case("https://moncoeur.app/stock/pas-un-id")]
    #[case("bonjour")]
    #[case("MC-25-1")]
    #[case("")]
    fn rejects_unknown_text(#[case] text: &str) {
        let err = resolve_scanned_code(text).unwrap_err();
        assert_eq!(err.to_string(), "QR code non reconnu");
    }

    #[test]
    fn renders_png_and_svg() {
        let png = render("https://moncoeur.app/stock/1", QrFormat::Png).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");

        let svg = String::from_utf8(render("https://moncoeur.app/stock/1", QrFormat::Svg).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[rstest]
    #[case(None, QrFormat::Png)]
    #[case(Some("SVG"), QrFormat::Svg)]
    fn parses_format(#[case] raw: Option<&str>, #[case] expected: QrFormat) {
        assert_eq!(QrFormat::parse(raw).unwrap(), expected);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(QrFormat::parse(Some("gif")).is_err());
    }
}
