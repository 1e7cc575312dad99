pub mod crm;
pub mod finance;
pub mod hr;
pub mod inventory;
pub mod logistics;
