//! Emulator channel configuration
//!
//! Connection parameters come from instrumentation arguments first and fall
//! back to the device property store for the port.

use std::collections::HashMap;
use std::fmt;

use devicectl_core::{DeviceControlError, Result, EMULATOR_HOST};

use crate::properties::PropertySource;

pub const ARGS_GRPC_PORT: &str = "grpc.port";
pub const ARGS_GRPC_TOKEN: &str = "grpc.token";
pub const ARGS_GRPC_KEY: &str = "grpc.key";
pub const ARGS_GRPC_CER: &str = "grpc.cer";
pub const ARGS_GRPC_CA: &str = "grpc.ca";
pub const PROPERTY_GRPC_PORT: &str = "mdevx.grpc_port";

/// Key/value arguments supplied when the run was launched
pub trait ArgumentSource: Send + Sync {
    /// Integer value, 0 when absent
    fn get_int(&self, key: &str) -> i32;

    /// String value, empty when absent
    fn get_string(&self, key: &str) -> String;
}

/// In-memory argument bundle
#[derive(Debug, Clone, Default)]
pub struct InstrumentationArgs {
    values: HashMap<String, String>,
}

impl InstrumentationArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an argument
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InstrumentationArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        for (key, value) in iter {
            args.insert(key, value);
        }
        args
    }
}

impl ArgumentSource for InstrumentationArgs {
    fn get_int(&self, key: &str) -> i32 {
        match self.values.get(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring non-integer argument {}={:?}", key, raw);
                0
            }),
            None => 0,
        }
    }

    fn get_string(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }
}

/// Everything needed to reach the emulator's control service
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    pub host: String,
    pub port: u16,
    /// Bearer token, empty for none
    pub auth_token: String,
    pub certificate: String,
    pub private_key: String,
    pub ca_certificate: String,
}

impl ConnectionParameters {
    /// Parameters with no token or TLS material
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth_token: String::new(),
            certificate: String::new(),
            private_key: String::new(),
            ca_certificate: String::new(),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    /// Whether any certificate or key path was supplied
    pub fn has_tls_material(&self) -> bool {
        !(self.certificate.is_empty()
            && self.private_key.is_empty()
            && self.ca_certificate.is_empty())
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "auth_token",
                &if self.auth_token.is_empty() { "<none>" } else { "<redacted>" },
            )
            .field("certificate", &self.certificate)
            .field("private_key", &self.private_key)
            .field("ca_certificate", &self.ca_certificate)
            .finish()
    }
}

/// Builds [`ConnectionParameters`] from arguments and properties
pub struct ConfigurationResolver<'a> {
    args: &'a dyn ArgumentSource,
    properties: &'a dyn PropertySource,
}

impl<'a> ConfigurationResolver<'a> {
    pub fn new(args: &'a dyn ArgumentSource, properties: &'a dyn PropertySource) -> Self {
        Self { args, properties }
    }

    /// Resolve connection parameters
    ///
    /// Fails with [`DeviceControlError::Configuration`] when no usable port
    /// can be found.
    pub fn resolve(&self) -> Result<ConnectionParameters> {
        let port = self.resolve_port()?;

        let params = ConnectionParameters {
            host: EMULATOR_HOST.to_string(),
            port,
            auth_token: self.args.get_string(ARGS_GRPC_TOKEN),
            certificate: self.args.get_string(ARGS_GRPC_CER),
            private_key: self.args.get_string(ARGS_GRPC_KEY),
            ca_certificate: self.args.get_string(ARGS_GRPC_CA),
        };

        tracing::debug!("Resolved emulator channel parameters: {:?}", params);
        Ok(params)
    }

    fn resolve_port(&self) -> Result<u16> {
        let arg_port = self.args.get_int(ARGS_GRPC_PORT);
        if arg_port != 0 {
            return u16::try_from(arg_port)
                .ok()
                .filter(|port| *port > 0)
                .ok_or_else(|| {
                    DeviceControlError::Configuration(format!(
                        "{} must be in 1..=65535, got {}",
                        ARGS_GRPC_PORT, arg_port
                    ))
                });
        }

        tracing::debug!(
            "{} not supplied, reading {} property",
            ARGS_GRPC_PORT,
            PROPERTY_GRPC_PORT
        );

        let raw = self.properties.get(PROPERTY_GRPC_PORT);
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DeviceControlError::Configuration(format!(
                "Emulator control port unavailable: pass {} or set the {} property. \
                 Please make sure the emulator's controller gRPC service is enabled.",
                ARGS_GRPC_PORT, PROPERTY_GRPC_PORT
            )));
        }

        raw.parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(|| {
                DeviceControlError::Configuration(format!(
                    "{} property is not a valid port: {:?}",
                    PROPERTY_GRPC_PORT, raw
                ))
            })
    }
}
