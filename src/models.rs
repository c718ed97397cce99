pub mod auth;
pub mod bag;
pub mod bank_account;
pub mod dashboard;
pub mod export;
pub mod import;
pub mod pagination;
pub mod response;
pub mod sale;
pub mod upload;
