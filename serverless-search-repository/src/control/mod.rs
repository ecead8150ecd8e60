//! HTTP implementation of the project control API client.

mod client;

pub use client::ServerlessControlClient;
