//! Admin console route handlers (role-gated via `RequireAdmin`).

pub mod categories;
pub mod panel;
pub mod payments;
pub mod products;
pub mod users;
