//! Integration tests against a local mockito server.
//!
//! Run with: cargo test --test integration

mod endpoints;
mod mock_server;
mod scenarios;
