//! QUIC transport configuration helpers
//!
//! This module provides QUIC client/server configuration for the control channel:
//! - Idle timeout (the only call timeout the channel imposes)
//! - Keep-alive so a long-lived channel survives quiet periods between tests

pub mod stream;

pub use stream::{read_message, write_message};

use quinn::{ClientConfig, IdleTimeout, ServerConfig, TransportConfig};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ChannelError, ChannelResult};

/// Tunables for the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOptions {
    /// Connection is considered dead after this long without traffic
    pub idle_timeout: Duration,
    /// Interval between keep-alive packets
    pub keep_alive_interval: Duration,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30),
            keep_alive_interval: Duration::from_secs(5),
        }
    }
}

impl ChannelOptions {
    /// Create options with a custom idle timeout
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    fn transport(&self) -> ChannelResult<TransportConfig> {
        let mut transport = TransportConfig::default();

        let idle = IdleTimeout::try_from(self.idle_timeout).map_err(|e| {
            ChannelError::Connection(format!("Invalid idle timeout {:?}: {}", self.idle_timeout, e))
        })?;
        transport.max_idle_timeout(Some(idle));
        transport.keep_alive_interval(Some(self.keep_alive_interval));

        Ok(transport)
    }
}

/// Configure QUIC client for the control channel
pub fn configure_client(
    crypto_config: Arc<quinn::crypto::rustls::QuicClientConfig>,
    options: &ChannelOptions,
) -> ChannelResult<ClientConfig> {
    let mut config = ClientConfig::new(crypto_config);
    config.transport_config(Arc::new(options.transport()?));
    Ok(config)
}

/// Configure QUIC server for a control service
pub fn configure_server(
    cert: Vec<rustls::pki_types::CertificateDer<'static>>,
    key: rustls::pki_types::PrivateKeyDer<'static>,
    options: &ChannelOptions,
) -> ChannelResult<ServerConfig> {
    let mut config = ServerConfig::with_single_cert(cert, key)
        .map_err(|e| ChannelError::Connection(format!("Failed to configure TLS: {}", e)))?;

    config.transport_config(Arc::new(options.transport()?));
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_options_default() {
        let options = ChannelOptions::default();
        assert_eq!(options.idle_timeout, Duration::from_secs(30));
        assert_eq!(options.keep_alive_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_channel_options_custom_idle() {
        let options = ChannelOptions::default().with_idle_timeout(Duration::from_millis(500));
        assert_eq!(options.idle_timeout, Duration::from_millis(500));
        assert!(options.transport().is_ok());
    }

    #[test]
    fn test_configure_server_creates_valid_config() {
        let cert = rcgen::generate_simple_self_signed(["localhost".to_string()]).unwrap();
        let cert_der = cert.cert.der().clone();
        let key_der = rustls::pki_types::PrivateKeyDer::Pkcs8(
            rustls::pki_types::PrivatePkcs8KeyDer::from(cert.key_pair.serialize_der()),
        );

        let config = configure_server(vec![cert_der], key_der, &ChannelOptions::default());
        assert!(config.is_ok());
    }
}
