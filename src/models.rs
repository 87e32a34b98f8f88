pub mod assistance;
pub mod auth;
pub mod commission;
pub mod inventory;
pub mod returns;
pub mod sales;
pub mod tenancy;
pub mod wallet;
