pub mod assistance;
pub mod auth;
pub mod commissions;
pub mod inventory;
pub mod returns;
pub mod sales;
pub mod wallet;
