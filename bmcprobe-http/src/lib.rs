//! HTTP client functionality for bmcprobe
//!
//! This crate builds the shared reqwest client from configuration and provides
//! the Redfish API seam used by the functional suite.

pub mod client;
pub mod errors;
pub mod redfish;
pub mod types;

// Re-export main types for convenience
pub use client::build_client;
pub use bmcprobe_config::HttpConfig;
pub use errors::HttpError;
pub use redfish::{paths, Auth, RedfishApi, RedfishClient, Session};
pub use types::{ApiResponse, HttpMethod};
