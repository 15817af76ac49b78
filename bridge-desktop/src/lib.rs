//! # Desktop Bridge Implementations
//!
//! Desktop/emulator implementations of the bridge traits, used by
//! integration hosts and tests. Mobile hosts ship their own adapters; this
//! crate is the reference wiring for development machines.
//!
//! - [`TokioFileSystem`] - async file I/O via `tokio::fs`
//! - [`ReqwestHttpClient`] - HTTP via `reqwest` with retry support
//! - [`DesktopNetworkMonitor`] - socket-level connectivity and host probing
//! - [`JsonFileStore`] - key-value JSON persistence in a single file
//! - [`LoggingWakeLock`] - wake-lock shim that only logs transitions

pub mod background;
pub mod filesystem;
pub mod http;
pub mod network;
pub mod store;

pub use background::LoggingWakeLock;
pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use network::DesktopNetworkMonitor;
pub use store::JsonFileStore;
