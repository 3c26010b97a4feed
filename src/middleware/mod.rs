pub mod admin;

pub use admin::{admin_gate, AdminUser};
