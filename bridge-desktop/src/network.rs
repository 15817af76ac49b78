//! Network Monitoring Implementation

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    network::{NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType},
};
use std::time::Duration;
use tracing::debug;

/// Desktop network monitor implementation
///
/// Provides basic connectivity detection via socket-level checks.
///
/// Note: platform-specific implementations (Linux netlink, macOS
/// SystemConfiguration, Windows WinAPI) would be more robust but require
/// additional dependencies.
pub struct DesktopNetworkMonitor {
    probe_timeout: Duration,
}

impl DesktopNetworkMonitor {
    /// Create a new network monitor
    pub fn new() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
        }
    }

    async fn check_connectivity(&self) -> NetworkStatus {
        match tokio::time::timeout(
            self.probe_timeout,
            tokio::net::TcpStream::connect("8.8.8.8:53"),
        )
        .await
        {
            Ok(Ok(_)) => NetworkStatus::Connected,
            _ => NetworkStatus::Disconnected,
        }
    }

    /// Extract a `host:port` connect target from a URL.
    fn connect_target(url: &str) -> Option<String> {
        let rest = url.split("://").nth(1).unwrap_or(url);
        let authority = rest.split('/').next()?;
        if authority.is_empty() {
            return None;
        }
        if authority.contains(':') {
            Some(authority.to_string())
        } else {
            let port = if url.starts_with("http://") { 80 } else { 443 };
            Some(format!("{}:{}", authority, port))
        }
    }
}

impl Default for DesktopNetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkMonitor for DesktopNetworkMonitor {
    async fn get_network_info(&self) -> Result<NetworkInfo> {
        let status = self.check_connectivity().await;

        let info = NetworkInfo {
            status,
            network_type: if status == NetworkStatus::Connected {
                // Desktop links can't be cheaply distinguished without
                // platform APIs.
                Some(NetworkType::Other)
            } else {
                None
            },
            // Desktop connections are typically not metered.
            is_metered: false,
        };

        debug!(status = ?status, "Network info updated");
        Ok(info)
    }

    async fn probe_host(&self, url: &str) -> bool {
        let Some(target) = Self::connect_target(url) else {
            return false;
        };
        matches!(
            tokio::time::timeout(self.probe_timeout, tokio::net::TcpStream::connect(&target))
                .await,
            Ok(Ok(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_target_parsing() {
        assert_eq!(
            DesktopNetworkMonitor::connect_target("https://api.example.com/stream/1").unwrap(),
            "api.example.com:443"
        );
        assert_eq!(
            DesktopNetworkMonitor::connect_target("http://10.0.2.2:8080/api").unwrap(),
            "10.0.2.2:8080"
        );
        assert!(DesktopNetworkMonitor::connect_target("https:///nohost").is_none());
    }
}
