pub mod user_repo;
pub use user_repo::UserRepository;
pub mod bank_account_repo;
pub use bank_account_repo::BankAccountRepository;
pub mod bag_repo;
pub use bag_repo::BagRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
