//! TLS setup for the emulator control channel
//!
//! The emulator's control service presents a throwaway certificate, so the
//! server identity is not checked. Handshake signatures still are.

use std::sync::Arc;

use devicectl_core::{DeviceControlError, Result};
use quinn::crypto::rustls::QuicClientConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};

use crate::config::ConnectionParameters;

/// Accepts any server certificate
#[derive(Debug)]
pub(crate) struct InsecureVerifier {
    provider: Arc<CryptoProvider>,
}

impl InsecureVerifier {
    pub(crate) fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for InsecureVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Build the client-side crypto config for the control channel
pub(crate) fn client_crypto(params: &ConnectionParameters) -> Result<QuicClientConfig> {
    if params.has_tls_material() {
        tracing::warn!(
            "TLS material supplied for {}:{} but not enforced; control channel is unauthenticated at the transport layer",
            params.host,
            params.port
        );
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let crypto = rustls::ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_protocol_versions(&[&rustls::version::TLS13])
        .map_err(|e| DeviceControlError::Connection(format!("Failed to configure TLS: {}", e)))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(InsecureVerifier::new(provider)))
        .with_no_client_auth();

    QuicClientConfig::try_from(crypto)
        .map_err(|e| DeviceControlError::Connection(format!("Failed to configure QUIC crypto: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_any_certificate() {
        let verifier = InsecureVerifier::new(Arc::new(rustls::crypto::ring::default_provider()));
        let cert = CertificateDer::from(vec![0u8; 16]);
        let name = ServerName::try_from("emulator-control").unwrap();

        assert!(verifier
            .verify_server_cert(&cert, &[], &name, &[], UnixTime::now())
            .is_ok());
        assert!(!verifier.supported_verify_schemes().is_empty());
    }

    #[test]
    fn test_client_crypto_with_and_without_material() {
        let mut params = ConnectionParameters::new("10.0.2.2", 8554);
        assert!(client_crypto(&params).is_ok());

        params.ca_certificate = "/data/local/tmp/ca.cer".to_string();
        assert!(client_crypto(&params).is_ok());
    }
}
