//! Blocking QUIC channel to the emulator's control service
//!
//! The channel owns a small tokio runtime so that [`DeviceController`] calls
//! can stay synchronous. The QUIC connection is made on the first call and
//! reused for the lifetime of the channel; once established it is never
//! replaced, so a channel that breaks fails every later call.
//!
//! [`DeviceController`]: devicectl_core::DeviceController

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use devicectl_core::transport::{configure_client, read_message, write_message};
use devicectl_core::{
    ChannelError, ChannelOptions, ChannelResult, ControlCommand, ControlMessage,
    DeviceControlError, RemoteController, Result, CONTROL_SERVER_NAME,
};
use quinn::{ClientConfig, Connection, Endpoint};
use tokio::runtime::Runtime;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::verifier::client_crypto;
use crate::config::ConnectionParameters;

/// Long-lived control channel to one emulator
pub struct EmulatorConnection {
    /// Established connection, set by the first successful call
    connection: Mutex<Option<Connection>>,
    endpoint: Endpoint,
    client_config: ClientConfig,
    remote: SocketAddr,
    auth_token: String,
    // Dropped last: the endpoint's driver task lives here
    runtime: Runtime,
}

impl EmulatorConnection {
    /// Create a channel with default [`ChannelOptions`]
    pub fn open(params: &ConnectionParameters) -> Result<Self> {
        Self::open_with(params, ChannelOptions::default())
    }

    /// Create a channel
    ///
    /// No network traffic happens here; the connection is made lazily by the
    /// first call. Fails with [`DeviceControlError::Connection`] when the
    /// channel cannot be built from `params`.
    pub fn open_with(params: &ConnectionParameters, options: ChannelOptions) -> Result<Self> {
        if params.port == 0 {
            return Err(DeviceControlError::Connection(
                "port 0 is not a valid control port".to_string(),
            ));
        }

        let ip: IpAddr = params.host.parse().map_err(|e| {
            DeviceControlError::Connection(format!("Invalid host {:?}: {}", params.host, e))
        })?;
        let remote = SocketAddr::new(ip, params.port);

        let crypto = client_crypto(params)?;
        let client_config = configure_client(Arc::new(crypto), &options)
            .map_err(|e| DeviceControlError::Connection(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("devicectl-channel")
            .enable_all()
            .build()
            .map_err(|e| {
                DeviceControlError::Connection(format!("Failed to start channel runtime: {}", e))
            })?;

        let bind_addr: SocketAddr = if remote.is_ipv6() {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        };

        let endpoint = {
            let _guard = runtime.enter();
            Endpoint::client(bind_addr).map_err(|e| {
                DeviceControlError::Connection(format!("Failed to create QUIC endpoint: {}", e))
            })?
        };

        info!("Control channel to {} ready", remote);

        Ok(Self {
            connection: Mutex::new(None),
            endpoint,
            client_config,
            remote,
            auth_token: params.auth_token.clone(),
            runtime,
        })
    }

    /// Address of the control service
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Remote-call handle sharing this channel
    pub fn controller_stub(self: &Arc<Self>) -> EmulatorControllerStub {
        EmulatorControllerStub {
            channel: Arc::clone(self),
        }
    }

    /// Send one command and wait for its response
    ///
    /// Blocks the calling thread. Must not be called from inside an async
    /// runtime.
    pub fn call(&self, command: ControlCommand) -> ChannelResult<()> {
        self.runtime.block_on(self.call_async(command))
    }

    async fn call_async(&self, command: ControlCommand) -> ChannelResult<()> {
        let connection = self.connection().await?;
        let (mut send, mut recv) = connection.open_bi().await?;

        debug!("Sending {} {} (id {})", command.operation, command.argument, command.id);
        let command_id = command.id;
        write_message(&mut send, &ControlMessage::request(command, &self.auth_token)).await?;
        send.finish()?;

        match read_message(&mut recv).await? {
            ControlMessage::Ack { command_id: id } if id == command_id => Ok(()),
            ControlMessage::Failure {
                command_id: id,
                status,
                message,
            } if id == command_id => Err(ChannelError::Remote { status, message }),
            other => Err(ChannelError::UnexpectedResponse(format!(
                "{:?} in reply to command {}",
                other, command_id
            ))),
        }
    }

    /// Established connection, connecting on first use
    async fn connection(&self) -> ChannelResult<Connection> {
        let mut slot = self.connection.lock().await;

        if let Some(connection) = slot.as_ref() {
            if let Some(reason) = connection.close_reason() {
                return Err(ChannelError::Closed(reason.to_string()));
            }
            return Ok(connection.clone());
        }

        info!("Connecting to control service at {}", self.remote);
        let connection = self
            .endpoint
            .connect_with(self.client_config.clone(), self.remote, CONTROL_SERVER_NAME)?
            .await?;
        info!("Connected to control service at {}", self.remote);

        *slot = Some(connection.clone());
        Ok(connection)
    }
}

/// [`RemoteController`] backed by an [`EmulatorConnection`]
#[derive(Clone)]
pub struct EmulatorControllerStub {
    channel: Arc<EmulatorConnection>,
}

impl RemoteController for EmulatorControllerStub {
    fn change_device_mode(&self, mode: i32) -> ChannelResult<()> {
        self.channel.call(ControlCommand::set_device_mode(mode))
    }

    fn change_screen_orientation(&self, orientation: i32) -> ChannelResult<()> {
        self.channel.call(ControlCommand::set_screen_orientation(orientation))
    }
}
