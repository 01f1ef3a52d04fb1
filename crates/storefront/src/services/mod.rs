//! Application services: the logic between route handlers and remote APIs.
//!
//! - [`auth`] - access-token claim decoding
//! - [`cart`] - in-memory cart container and its quantity rules
//! - [`checkout`] - checkout attempt state machine
//! - [`filter`] - pure product filter engine
//! - [`media`] - signed direct uploads to the image host

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod filter;
pub mod media;
