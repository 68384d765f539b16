// fortitrack-api: Async Rust client for the FortiOS REST monitor API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::FortiOsClient;
pub use error::Error;
pub use models::{ApiResponse, FirmwareVersion, MINIMUM_SUPPORTED_VERSION, SystemStatus};
pub use transport::{TlsMode, TransportConfig};
