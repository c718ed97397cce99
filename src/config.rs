// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{BagRepository, BankAccountRepository, DashboardRepository, SaleRepository, UserRepository},
    services::{
        auth::AuthService,
        bag_service::BagService,
        bank_account_service::BankAccountService,
        brand::BrandMatcher,
        dashboard_service::DashboardService,
        email::{AdminNotifier, EmailService},
        export_service::ExportService,
        import_service::ImportService,
        sale_service::SaleService,
        seed_service::{SeedAdmin, SeedService},
        storage::{BlobStore, LocalBlobStore},
        user_service::UserService,
    },
};

const DEFAULT_SELLER_SHEETS: &str = "beatrice,tiziana,goergio,jenacha";

/// Tudo o que vem do ambiente (`.env` incluído), lido uma única vez.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub public_base_url: String,
    pub upload_dir: PathBuf,
    pub zeptomail_api_key: Option<String>,
    pub zeptomail_from_email: String,
    pub import_seller_sheets: Vec<String>,
    pub import_brands: Option<String>,
    pub seed_admin: SeedAdmin,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let database_max_connections = match optional("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {}", raw))?,
            None => 5,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            public_base_url: optional("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
            zeptomail_api_key: optional("ZEPTOMAIL_API_KEY"),
            zeptomail_from_email: optional("ZEPTOMAIL_FROM_EMAIL")
                .unwrap_or_else(|| "noreply@moncoeur.app".to_string()),
            import_seller_sheets: parse_list(
                &optional("IMPORT_SELLER_SHEETS").unwrap_or_else(|| DEFAULT_SELLER_SHEETS.to_string()),
            ),
            import_brands: optional("IMPORT_BRANDS"),
            seed_admin: SeedAdmin {
                email: optional("SEED_ADMIN_EMAIL").unwrap_or_else(|| "admin@moncoeur.app".to_string()),
                password: optional("SEED_ADMIN_PASSWORD"),
                name: optional("SEED_ADMIN_NAME").unwrap_or_else(|| "Admin".to_string()),
            },
        })
    }

    pub fn brand_matcher(&self) -> BrandMatcher {
        match &self.import_brands {
            Some(raw) => BrandMatcher::from_list(raw),
            None => BrandMatcher::default(),
        }
    }
}

// Variável ausente ou vazia = None
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub bank_account_service: BankAccountService,
    pub bag_service: BagService,
    pub sale_service: SaleService,
    pub import_service: ImportService,
    pub export_service: ExportService,
    pub dashboard_service: DashboardService,
    pub seed_service: SeedService,
    pub blob_store: Arc<dyn BlobStore>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_parts(config, db_pool))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn from_parts(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let bank_account_repo = BankAccountRepository::new(db_pool.clone());
        let bag_repo = BagRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let blob_store: Arc<dyn BlobStore> =
            Arc::new(LocalBlobStore::new(config.upload_dir.clone(), &config.public_base_url));

        let email = EmailService::new(config.zeptomail_api_key.clone(), config.zeptomail_from_email.clone());
        if config.zeptomail_api_key.is_none() {
            tracing::warn!("ZEPTOMAIL_API_KEY ausente: notificações por e-mail desativadas");
        }
        let notifier = AdminNotifier::new(user_repo.clone(), email);

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone());
        let user_service = UserService::new(user_repo.clone(), db_pool.clone());
        let bank_account_service = BankAccountService::new(bank_account_repo.clone(), db_pool.clone());
        let bag_service = BagService::new(
            db_pool.clone(),
            bag_repo.clone(),
            sale_repo.clone(),
            bank_account_repo.clone(),
            blob_store.clone(),
            notifier.clone(),
            config.public_base_url.clone(),
        );
        let sale_service = SaleService::new(
            db_pool.clone(),
            sale_repo.clone(),
            bag_repo.clone(),
            bank_account_repo.clone(),
            notifier,
        );
        let import_service = ImportService::new(
            db_pool.clone(),
            bag_repo.clone(),
            sale_repo.clone(),
            bank_account_repo.clone(),
            config.brand_matcher(),
            config.import_seller_sheets.clone(),
        );
        let export_service = ExportService::new(bag_repo, sale_repo);
        let dashboard_service = DashboardService::new(dashboard_repo);
        let seed_service = SeedService::new(
            db_pool.clone(),
            user_repo,
            bank_account_repo,
            config.seed_admin.clone(),
            config.import_seller_sheets.clone(),
        );

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            user_service,
            bank_account_service,
            bag_service,
            sale_service,
            import_service,
            export_service,
            dashboard_service,
            seed_service,
            blob_store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seller_list_is_normalized() {
        assert_eq!(
            parse_list(" Beatrice, TIZIANA ,,goergio"),
            vec!["beatrice", "tiziana", "goergio"]
        );
    }
}
