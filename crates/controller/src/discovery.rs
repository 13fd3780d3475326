//! Host-supplied controller discovery
//!
//! A host environment may already ship a device controller. Providers are
//! registered explicitly, in priority order; the first one that yields a
//! controller wins.

use std::sync::Arc;

use devicectl_core::DeviceController;

/// Source of a host-supplied controller
pub trait ControllerProvider: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// The provider's controller, if it has one in this environment
    fn load(&self) -> Option<Arc<dyn DeviceController>>;
}

/// Provider around a controller that already exists
pub struct StaticProvider {
    name: String,
    controller: Arc<dyn DeviceController>,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>, controller: Arc<dyn DeviceController>) -> Self {
        Self {
            name: name.into(),
            controller,
        }
    }
}

impl ControllerProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Option<Arc<dyn DeviceController>> {
        Some(Arc::clone(&self.controller))
    }
}

/// Provider that runs a closure on every lookup
pub struct FnProvider<F> {
    name: String,
    load: F,
}

impl<F> FnProvider<F>
where
    F: Fn() -> Option<Arc<dyn DeviceController>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, load: F) -> Self {
        Self {
            name: name.into(),
            load,
        }
    }
}

impl<F> ControllerProvider for FnProvider<F>
where
    F: Fn() -> Option<Arc<dyn DeviceController>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Option<Arc<dyn DeviceController>> {
        (self.load)()
    }
}

/// Ordered list of controller providers
#[derive(Default)]
pub struct ControllerRegistry {
    providers: Vec<Box<dyn ControllerProvider>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider (lower priority than those already registered)
    pub fn register(&mut self, provider: impl ControllerProvider + 'static) -> &mut Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn with_provider(mut self, provider: impl ControllerProvider + 'static) -> Self {
        self.register(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First controller any provider yields
    pub fn discover(&self) -> Option<Arc<dyn DeviceController>> {
        for provider in &self.providers {
            match provider.load() {
                Some(controller) => {
                    tracing::info!("Found host device controller from {}", provider.name());
                    return Some(controller);
                }
                None => tracing::debug!("Provider {} has no controller", provider.name()),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicectl_core::{DeviceControlError, Result};

    struct Tagged(i32);

    impl DeviceController for Tagged {
        fn set_device_mode(&self, _mode: i32) -> Result<()> {
            Err(DeviceControlError::UnsupportedOperation(self.0.to_string()))
        }

        fn set_screen_orientation(&self, _orientation: i32) -> Result<()> {
            Ok(())
        }
    }

    fn tag(controller: &Arc<dyn DeviceController>) -> String {
        match controller.set_device_mode(0) {
            Err(DeviceControlError::UnsupportedOperation(tag)) => tag,
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_registry_discovers_nothing() {
        let registry = ControllerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.discover().is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let registry = ControllerRegistry::new()
            .with_provider(FnProvider::new("absent", || None))
            .with_provider(StaticProvider::new("first", Arc::new(Tagged(1))))
            .with_provider(StaticProvider::new("second", Arc::new(Tagged(2))));

        assert_eq!(registry.len(), 3);
        let controller = registry.discover().unwrap();
        assert_eq!(tag(&controller), "1");
    }

    #[test]
    fn test_fn_provider_is_consulted_each_time() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let lookups = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&lookups);
        let mut registry = ControllerRegistry::new();
        registry.register(FnProvider::new("counting", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            None
        }));

        assert!(registry.discover().is_none());
        assert!(registry.discover().is_none());
        assert_eq!(lookups.load(Ordering::SeqCst), 2);
    }
}
