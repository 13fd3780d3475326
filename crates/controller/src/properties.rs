//! Platform property store and device identity probe

use std::collections::HashMap;
use std::process::Command;
use std::sync::Arc;

/// Process-wide device property lookup
///
/// A blank result means the property is unset.
pub trait PropertySource: Send + Sync {
    fn get(&self, key: &str) -> String;
}

impl<T: PropertySource + ?Sized> PropertySource for Arc<T> {
    fn get(&self, key: &str) -> String {
        (**self).get(key)
    }
}

/// Property store backed by the device's `getprop` tool
#[derive(Debug, Clone)]
pub struct SystemProperties {
    program: String,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self::with_program("getprop")
    }

    /// Use a different lookup program (called as `<program> <key>`)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemProperties {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for SystemProperties {
    fn get(&self, key: &str) -> String {
        match Command::new(&self.program).arg(key).output() {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            Ok(output) => {
                tracing::debug!("{} {} exited with {}", self.program, key, output.status);
                String::new()
            }
            Err(e) => {
                tracing::debug!("Failed to run {} {}: {}", self.program, key, e);
                String::new()
            }
        }
    }
}

/// In-memory property store
#[derive(Debug, Clone, Default)]
pub struct StaticProperties {
    values: HashMap<String, String>,
}

impl StaticProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl PropertySource for StaticProperties {
    fn get(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }
}

/// Answers "is the current device an emulator"
pub trait EmulatorProbe: Send + Sync {
    fn is_emulator(&self) -> bool;
}

impl<T: EmulatorProbe + ?Sized> EmulatorProbe for Box<T> {
    fn is_emulator(&self) -> bool {
        (**self).is_emulator()
    }
}

/// Detects an emulator from well-known build properties
pub struct PropertyEmulatorProbe<P> {
    properties: P,
}

impl<P: PropertySource> PropertyEmulatorProbe<P> {
    const QEMU_KEYS: [&'static str; 2] = ["ro.kernel.qemu", "ro.boot.qemu"];
    const EMULATOR_HARDWARE: [&'static str; 2] = ["goldfish", "ranchu"];

    pub fn new(properties: P) -> Self {
        Self { properties }
    }
}

impl<P: PropertySource> EmulatorProbe for PropertyEmulatorProbe<P> {
    fn is_emulator(&self) -> bool {
        if Self::QEMU_KEYS
            .iter()
            .any(|key| self.properties.get(key).trim() == "1")
        {
            return true;
        }

        let hardware = self.properties.get("ro.hardware");
        Self::EMULATOR_HARDWARE.contains(&hardware.trim())
    }
}

/// Probe with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub bool);

impl EmulatorProbe for FixedProbe {
    fn is_emulator(&self) -> bool {
        self.0
    }
}
