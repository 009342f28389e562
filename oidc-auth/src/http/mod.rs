//! HTTP client building for identity provider back-channel calls.

mod client;

pub use client::{HttpClientBuilder, HttpClientConfig};
