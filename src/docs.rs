// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Bank Accounts ---
        handlers::bank_accounts::list_bank_accounts,
        handlers::bank_accounts::get_bank_account,
        handlers::bank_accounts::create_bank_account,
        handlers::bank_accounts::update_bank_account,
        handlers::bank_accounts::delete_bank_account,

        // --- Bags ---
        handlers::bags::list_bags,
        handlers::bags::create_bag,
        handlers::bags::get_bag,
        handlers::bags::update_bag,
        handlers::bags::delete_bag,
        handlers::bags::get_bag_qrcode,
        handlers::bags::scan_bag,

        // --- Sales ---
        handlers::sales::list_sales,
        handlers::sales::create_sale,
        handlers::sales::get_sale,
        handlers::sales::update_sale,
        handlers::sales::delete_sale,

        // --- Import / Export ---
        handlers::import::import_workbook,
        handlers::export::export_csv,

        // --- Upload ---
        handlers::upload::upload_image,
        handlers::upload::delete_image,

        // --- Dashboard ---
        handlers::dashboard::get_stats,

        // --- Seed ---
        handlers::seed::seed,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Bank Accounts ---
            models::bank_account::BankAccount,
            models::bank_account::BankAccountView,
            models::bank_account::CreateBankAccountPayload,
            models::bank_account::UpdateBankAccountPayload,

            // --- Bags ---
            models::bag::BagStatus,
            models::bag::BagCondition,
            models::bag::Platform,
            models::bag::Bag,
            models::bag::BagView,
            models::bag::CreateBagPayload,
            models::bag::UpdateBagPayload,
            models::bag::BagListResponse,
            models::bag::ScanPayload,

            // --- Sales ---
            models::sale::Sale,
            models::sale::SaleView,
            models::sale::CreateSalePayload,
            models::sale::UpdateSalePayload,
            models::sale::SaleListResponse,

            // --- DASHBOARD ---
            models::dashboard::DashboardStats,
            models::dashboard::RecentSale,
            models::dashboard::MonthlyEntry,
            models::dashboard::PlatformEntry,
            models::dashboard::BrandEntry,

            // --- Comuns ---
            models::pagination::Pagination,
            models::import::ImportResult,
            models::upload::UploadResponse,
            models::upload::FileUploadForm,
            models::response::MessageResponse,
            models::response::SeedResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Users", description = "Gestão de Usuários (admin)"),
        (name = "Bank Accounts", description = "Contas Bancárias"),
        (name = "Bags", description = "Estoque de Sacs, QR codes e Scan"),
        (name = "Sales", description = "Vendas e Margens"),
        (name = "Import", description = "Importação de Planilhas Excel"),
        (name = "Export", description = "Exportação CSV"),
        (name = "Upload", description = "Fotos dos Sacs"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais"),
        (name = "Seed", description = "Inicialização da Base")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in ["/api/bags/{id}/qrcode", "/api/sales/{id}", "/api/import", "/api/seed"] {
            assert!(doc.paths.paths.contains_key(path), "rota ausente: {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
