pub mod auth;
pub mod bags;
pub mod bank_accounts;
pub mod dashboard;
pub mod export;
pub mod import;
pub mod sales;
pub mod seed;
pub mod upload;
pub mod users;
