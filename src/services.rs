pub mod auth;
pub mod bag_service;
pub mod bank_account_service;
pub mod brand;
pub mod dashboard_service;
pub mod email;
pub mod export_service;
pub mod import_service;
pub mod margin;
pub mod qr;
pub mod sale_service;
pub mod seed_service;
pub mod spreadsheet;
pub mod status_sync;
pub mod storage;
pub mod user_service;
