pub mod assistance_service;
pub mod auth;
pub mod commission_service;
pub mod inventory_service;
pub mod leftover_service;
pub mod return_service;
pub mod sales_service;
pub mod wallet_service;
