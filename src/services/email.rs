// src/services/email.rs

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;

use crate::{common::error::AppError, db::UserRepository};

const ZEPTOMAIL_URL: &str = "https://api.zeptomail.eu/v1.1/email";
const FROM_NAME: &str = "MonCoeur";

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
}

/// Cliente da API transacional do ZeptoMail. Sem chave, fica desligado.
#[derive(Clone)]
pub struct EmailService {
    client: reqwest::Client,
    api_key: Option<String>,
    from_email: String,
}

impl EmailService {
    pub fn new(api_key: Option<String>, from_email: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from_email,
        }
    }

    /// `Ok(false)` quando o envio foi pulado (sem chave ou sem destinatários).
    pub async fn send(&self, to: &[String], message: &EmailMessage) -> Result<bool, AppError> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("ZeptoMail nao configurado, e-mail ignorado: {}", message.subject);
            return Ok(false);
        };
        if to.is_empty() {
            return Ok(false);
        }

        let body = json!({
            "from": { "address": self.from_email, "name": FROM_NAME },
            "to": to
                .iter()
                .map(|address| json!({ "email_address": { "address": address } }))
                .collect::<Vec<_>>(),
            "subject": message.subject,
            "htmlbody": message.html_body,
            "textbody": strip_html(&message.html_body),
        });

        let response = self
            .client
            .post(ZEPTOMAIL_URL)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao contatar o ZeptoMail: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("ZeptoMail respondeu {}: {}", status, detail).into());
        }

        Ok(true)
    }
}

/// Notifica os administradores ativos. Nunca falha: erros vão para o log.
#[derive(Clone)]
pub struct AdminNotifier {
    user_repo: UserRepository,
    email: EmailService,
}

impl AdminNotifier {
    pub fn new(user_repo: UserRepository, email: EmailService) -> Self {
        Self { user_repo, email }
    }

    pub async fn notify(&self, message: EmailMessage) {
        let recipients = match self.user_repo.active_admin_emails().await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::error!("Falha ao buscar administradores para notificação: {}", e);
                return;
            }
        };

        if let Err(e) = self.email.send(&recipients, &message).await {
            tracing::error!("Falha ao enviar notificação '{}': {}", message.subject, e);
        }
    }
}

// --- Texto ---

static BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("regex valida"));
static PARAGRAPH_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p>").expect("regex valida"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("regex valida"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("regex valida"));

/// Versão texto do corpo HTML.
pub fn strip_html(html: &str) -> String {
    let text = BREAK_TAG.replace_all(html, "\n");
    let text = PARAGRAPH_END.replace_all(&text, "\n\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let trimmed: Vec<&str> = text.lines().map(str::trim).collect();
    BLANK_LINES.replace_all(trimmed.join("\n").trim(), "\n\n").into_owned()
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Valor em euros no formato francês: "1 234,50 €".
pub fn format_eur(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let formatted = format!("{:.2}", rounded.abs());
    let (integer, cents) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::new();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{},{} €", sign, grouped, cents)
}

fn layout(background: &str, title: &str, title_color: &str, intro: &str, rows: &[(&str, String)]) -> String {
    let rows_html: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<tr><td style="padding: 8px;"><strong>{}</strong></td><td style="padding: 8px;">{}</td></tr>"#,
                label, value
            )
        })
        .collect();

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<div style="background-color: #f472b6; padding: 20px; text-align: center;"><h1 style="color: white; margin: 0;">MonCoeur</h1></div>
<div style="padding: 20px; background-color: {background};">
<h2 style="color: {title_color};">{title}</h2>
<p>{intro}</p>
<table style="width: 100%; border-collapse: collapse; margin-top: 20px;">{rows_html}</table>
</div>
<div style="padding: 20px; text-align: center; color: #9ca3af; font-size: 12px;"><p>Cet email a ete envoye automatiquement par MonCoeur.</p></div>
</div>"#
    )
}

pub fn new_bag_email(
    reference: &str,
    brand: &str,
    model: &str,
    purchase_price: Decimal,
    created_by_name: &str,
) -> EmailMessage {
    EmailMessage {
        subject: format!("[MonCoeur] Nouveau sac enregistre: {} {}", brand, model),
        html_body: layout(
            "#fdf2f8",
            "Nouveau sac enregistre",
            "#be185d",
            &format!(
                "Un nouveau sac a ete ajoute au stock par <strong>{}</strong>.",
                escape_html(created_by_name)
            ),
            &[
                ("Reference", escape_html(reference)),
                ("Marque", escape_html(brand)),
                ("Modele", escape_html(model)),
                ("Prix d'achat", format_eur(purchase_price)),
            ],
        ),
    }
}

pub struct SaleEmailData<'a> {
    pub reference: &'a str,
    pub brand: &'a str,
    pub model: &'a str,
    pub sale_price: Decimal,
    pub margin: Decimal,
    pub margin_percent: Decimal,
    pub sold_by_name: &'a str,
}

pub fn sale_email(data: &SaleEmailData<'_>) -> EmailMessage {
    let positive = !data.margin.is_sign_negative() || data.margin.is_zero();
    let color = if positive { "#16a34a" } else { "#dc2626" };
    let percent = data
        .margin_percent
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    EmailMessage {
        subject: format!(
            "[MonCoeur] Vente realisee: {} {} - Marge: {}",
            data.brand,
            data.model,
            format_eur(data.margin)
        ),
        html_body: layout(
            "#f0fdf4",
            "Vente realisee",
            "#15803d",
            &format!(
                "Une vente a ete enregistree par <strong>{}</strong>.",
                escape_html(data.sold_by_name)
            ),
            &[
                ("Reference", escape_html(data.reference)),
                ("Sac", format!("{} - {}", escape_html(data.brand), escape_html(data.model))),
                ("Prix de vente", format_eur(data.sale_price)),
                (
                    "Marge",
                    format!(
                        r#"<span style="color: {}; font-weight: bold;">{}{} ({:.1}%)</span>"#,
                        color,
                        if positive { "+" } else { "" },
                        format_eur(data.margin),
                        percent
                    ),
                ),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dec;
    use rstest::rstest;

    #[rstest]
    #[case("0", "0,00 €")]
    #[case("65", "65,00 €")]
    #[case("1234.5", "1 234,50 €")]
    #[case("-1200000.456", "-1 200 000,46 €")]
    fn formats_euros_the_french_way(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(format_eur(dec(value)), expected);
    }

    #[test]
    fn strips_html_to_text() {
        let text = strip_html("<p>Bonjour&nbsp;<strong>Nadia</strong></p><p>A&amp;B<br/>fin</p>");
        assert_eq!(text, "Bonjour Nadia\n\nA&B\nfin");
    }

    #[test]
    fn new_bag_email_escapes_user_content() {
        let message = new_bag_email("MC-2025-00001", "Chanel", "<Timeless>", dec("850"), "Nadia");
        assert_eq!(message.subject, "[MonCoeur] Nouveau sac enregistre: Chanel <Timeless>");
        assert!(message.html_body.contains("&lt;Timeless&gt;"));
        assert!(message.html_body.contains("850,00 €"));
    }

    #[test]
    fn sale_email_shows_signed_margin() {
        let message = sale_email(&SaleEmailData {
            reference: "MC-2025-00001",
            brand: "Louis Vuitton",
            model: "Neverfull",
            sale_price: dec("200"),
            margin: dec("65"),
            margin_percent: dec("54.17"),
            sold_by_name: "Nadia",
        });
        assert_eq!(message.subject, "[MonCoeur] Vente realisee: Louis Vuitton Neverfull - Marge: 65,00 €");
        assert!(message.html_body.contains("+65,00 € (54.2%)"));
        assert!(message.html_body.contains("#16a34a"));
    }

    #[tokio::test]
    async fn sending_without_api_key_is_skipped() {
        let service = EmailService::new(None, "noreply@moncoeur.app".into());
        let message = new_bag_email("MC-1", "Maje", "Cabas", dec("10"), "Nadia");
        assert!(!service.send(&["admin@moncoeur.app".into()], &message).await.unwrap());
    }
}
