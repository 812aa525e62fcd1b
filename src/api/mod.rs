pub mod context;
pub mod v1;
