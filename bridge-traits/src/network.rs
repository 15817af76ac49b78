//! Network Monitoring Abstraction
//!
//! Provides network connectivity and status information.

use crate::error::Result;

/// Network connection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    /// Cellular/mobile data connection
    Cellular,
    /// WiFi connection
    WiFi,
    /// Ethernet connection
    Ethernet,
    /// Other or unknown connection type
    Other,
}

/// Network connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Connected to network
    Connected,
    /// Not connected to any network
    Disconnected,
    /// Connection status unknown or indeterminate
    Indeterminate,
}

/// Network information
#[derive(Debug, Clone)]
pub struct NetworkInfo {
    pub status: NetworkStatus,
    pub network_type: Option<NetworkType>,
    /// Whether the connection is metered (has data limits/costs)
    pub is_metered: bool,
}

/// Network monitor trait
///
/// Provides connectivity information so the core can fail fast on downloads
/// while offline and defer pre-caching on dead links.
///
/// The OS-level connectivity signal is unreliable as a proxy for actually
/// reaching the streaming host (captive portals, half-open cellular links,
/// emulator bridges), which is why [`NetworkMonitor::probe_host`] exists as a
/// separate, explicit reachability check against a concrete URL.
///
/// # Platform Support
///
/// - **Desktop**: socket-level connectivity checks
/// - **iOS**: Network framework, Reachability
/// - **Android**: ConnectivityManager
#[async_trait::async_trait]
pub trait NetworkMonitor: Send + Sync {
    /// Get current network information
    async fn get_network_info(&self) -> Result<NetworkInfo>;

    /// Check if currently connected to any network
    async fn is_connected(&self) -> bool {
        matches!(
            self.get_network_info().await,
            Ok(NetworkInfo {
                status: NetworkStatus::Connected,
                ..
            })
        )
    }

    /// Check if connection is metered
    async fn is_metered(&self) -> bool {
        matches!(
            self.get_network_info().await,
            Ok(NetworkInfo {
                is_metered: true,
                ..
            })
        )
    }

    /// Probe real reachability of a specific host URL.
    ///
    /// Returns `true` only when the host actually answers. Implementations
    /// should keep this lightweight (HEAD request or TCP connect) and bound
    /// it with a short timeout.
    async fn probe_host(&self, url: &str) -> bool;
}
