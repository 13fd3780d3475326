//! QUIC server for the control service
//!
//! Serves one request per bidirectional stream, the way each control call
//! arrives from a device controller.

use anyhow::{Context, Result};
use devicectl_core::transport::{configure_server, read_message, write_message};
use devicectl_core::{ChannelOptions, ControlCommand, ControlMessage, Operation, StatusCode};
use quinn::{Endpoint, TokioRuntime};
use rcgen::KeyPair;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::handler::ControlHandler;

/// Stub emulator control server
pub struct StubServer {
    /// QUIC endpoint
    endpoint: Endpoint,
    /// Applies decoded commands
    handler: Arc<dyn ControlHandler>,
    /// Token every request must carry, if set
    auth_token: Option<Arc<str>>,
}

impl StubServer {
    /// Create new server with a fresh self-signed certificate
    ///
    /// Must be called from within a tokio runtime.
    pub async fn bind(
        bind_addr: SocketAddr,
        handler: Arc<dyn ControlHandler>,
        auth_token: Option<String>,
    ) -> Result<Self> {
        let (cert, key_pair) = generate_cert_with_keypair()?;
        let key = PrivateKeyDer::Pkcs8(key_pair.serialize_der().into());

        let cfg = configure_server(vec![cert], key, &ChannelOptions::default())
            .context("Failed to configure server")?;

        let socket = std::net::UdpSocket::bind(bind_addr)
            .with_context(|| format!("Failed to bind UDP socket on {}", bind_addr))?;

        let runtime = Arc::new(TokioRuntime);
        let endpoint = Endpoint::new(Default::default(), Some(cfg), socket, runtime)
            .context("Failed to create QUIC endpoint")?;

        tracing::info!("Control service listening on {}", endpoint.local_addr()?);

        Ok(Self {
            endpoint,
            handler,
            auth_token: auth_token.filter(|t| !t.is_empty()).map(Arc::from),
        })
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.endpoint.local_addr()?)
    }

    /// Run server (accepts connections until the endpoint closes)
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run server until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                incoming = self.endpoint.accept() => {
                    match incoming {
                        Some(incoming) => {
                            let handler = Arc::clone(&self.handler);
                            let auth_token = self.auth_token.clone();
                            tokio::spawn(async move {
                                if let Err(e) = Self::handle_connection(incoming, handler, auth_token).await {
                                    tracing::error!("Connection error: {}", e);
                                }
                            });
                        }
                        None => {
                            tracing::warn!("Endpoint closed");
                            break;
                        }
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received");
                    self.endpoint.close(0u32.into(), b"shutdown");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle single connection
    async fn handle_connection(
        incoming: quinn::Incoming,
        handler: Arc<dyn ControlHandler>,
        auth_token: Option<Arc<str>>,
    ) -> Result<()> {
        let connection = incoming.accept()?.await?;
        let remote_addr = connection.remote_address();
        tracing::info!("Connection from {}", remote_addr);

        loop {
            match connection.accept_bi().await {
                Ok((send, recv)) => {
                    let handler = Arc::clone(&handler);
                    let auth_token = auth_token.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_stream(send, recv, handler, auth_token).await {
                            tracing::error!("Stream error from {}: {}", remote_addr, e);
                        }
                    });
                }
                Err(quinn::ConnectionError::ApplicationClosed(_))
                | Err(quinn::ConnectionError::LocallyClosed) => {
                    tracing::info!("Connection closed: {}", remote_addr);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Accept stream error from {}: {}", remote_addr, e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle single request stream
    async fn handle_stream(
        mut send: quinn::SendStream,
        mut recv: quinn::RecvStream,
        handler: Arc<dyn ControlHandler>,
        auth_token: Option<Arc<str>>,
    ) -> Result<()> {
        let request = read_message(&mut recv).await?;
        tracing::debug!("Received {:?}", request);

        let response = match request {
            ControlMessage::Request {
                auth_token: provided,
                command,
            } => {
                if !Self::authorized(auth_token.as_deref(), provided.as_deref()) {
                    tracing::warn!("Rejected command {}: bad or missing token", command.id);
                    ControlMessage::failure(
                        command.id,
                        StatusCode::Unauthenticated,
                        "missing or invalid auth token",
                    )
                } else {
                    Self::dispatch(handler.as_ref(), &command).await
                }
            }
            other => {
                tracing::warn!("Unexpected message on control stream: {:?}", other);
                ControlMessage::failure(0, StatusCode::Unimplemented, "expected a request")
            }
        };

        write_message(&mut send, &response).await?;
        send.finish()?;
        Ok(())
    }

    fn authorized(expected: Option<&str>, provided: Option<&str>) -> bool {
        match expected {
            Some(expected) => provided == Some(expected),
            None => true,
        }
    }

    async fn dispatch(handler: &dyn ControlHandler, command: &ControlCommand) -> ControlMessage {
        let result = match command.operation {
            Operation::SetDeviceMode => handler.change_device_mode(command.argument).await,
            Operation::SetScreenOrientation => {
                handler.change_screen_orientation(command.argument).await
            }
        };

        match result {
            Ok(()) => ControlMessage::ack(command.id),
            Err((status, message)) => {
                tracing::warn!("{} {} rejected: {}", command.operation, command.argument, message);
                ControlMessage::failure(command.id, status, message)
            }
        }
    }
}

/// Generate a self-signed certificate for the control server name
fn generate_cert_with_keypair() -> Result<(CertificateDer<'static>, KeyPair)> {
    let cert = rcgen::generate_simple_self_signed(vec![
        devicectl_core::CONTROL_SERVER_NAME.to_string(),
    ])
    .context("Failed to generate certificate")?;

    Ok((CertificateDer::from(cert.cert.der().to_vec()), cert.key_pair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::RecordingHandler;

    #[test]
    fn test_authorized_without_token() {
        assert!(StubServer::authorized(None, None));
        assert!(StubServer::authorized(None, Some("anything")));
    }

    #[test]
    fn test_authorized_with_token() {
        assert!(StubServer::authorized(Some("tok"), Some("tok")));
        assert!(!StubServer::authorized(Some("tok"), Some("other")));
        assert!(!StubServer::authorized(Some("tok"), None));
    }

    #[tokio::test]
    async fn test_dispatch_ack_and_failure() {
        let handler = RecordingHandler::new();

        let ok = ControlCommand::set_device_mode(1);
        let response = StubServer::dispatch(&handler, &ok).await;
        assert_eq!(response, ControlMessage::ack(ok.id));

        let bad = ControlCommand::set_device_mode(42);
        match StubServer::dispatch(&handler, &bad).await {
            ControlMessage::Failure { command_id, status, .. } => {
                assert_eq!(command_id, bad.id);
                assert_eq!(status, StatusCode::InvalidArgument);
            }
            other => panic!("Expected Failure, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_cert() {
        let (cert, _key) = generate_cert_with_keypair().unwrap();
        assert!(!cert.as_ref().is_empty());
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let handler = Arc::new(RecordingHandler::new());
        let server = StubServer::bind("127.0.0.1:0".parse().unwrap(), handler, Some(String::new()))
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
        // Empty token means no auth
        assert!(server.auth_token.is_none());
    }
}
