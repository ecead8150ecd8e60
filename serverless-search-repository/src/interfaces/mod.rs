//! Interface definitions for the remote APIs.
//!
//! The workflow only depends on these traits, which allows the HTTP backed
//! implementations to be swapped for in-memory ones in tests.

mod control_plane_client;
mod search_engine_client;

pub use control_plane_client::ControlPlaneClient;
pub use search_engine_client::{SearchClientFactory, SearchEngineClient};
