pub mod audit_store;
pub mod object_store;
pub mod secret_store;
