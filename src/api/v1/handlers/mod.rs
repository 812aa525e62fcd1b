pub mod admin;
pub mod health;
pub mod internal;
pub mod pages;
pub mod profile;
pub mod session;
