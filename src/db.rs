pub mod user_repo;
pub use user_repo::UserRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod commission_repo;
pub use commission_repo::CommissionRepository;
pub mod assistance_repo;
pub use assistance_repo::AssistanceRepository;
pub mod wallet_repo;
pub use wallet_repo::WalletRepository;
