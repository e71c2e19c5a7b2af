//! HTTP integration tests.
//!
//! Starts the reference axum server and exercises it with `HttpRemote` and reqwest.

#![cfg(all(feature = "http", feature = "server"))]

mod support;
mod sync;
