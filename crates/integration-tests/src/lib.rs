//! Integration tests for Lumora Beauty.
//!
//! The tests live in `tests/` and exercise the storefront crate's public
//! library surface: the cart container, the filter engine, the checkout
//! state machine, and the data-access conversions. Nothing here talks to a
//! live backend - the pieces under test are the pure ones by design.
