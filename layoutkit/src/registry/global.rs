//! Process-wide registry.
//!
//! The registry is initialized once at startup, populated, and then only read.
//! A second [`initialize`] before [`reset`] is an error.

use std::sync::{PoisonError, RwLock};

use crate::{
    error::RegistryError,
    model::ComponentDescriptor,
    registry::{ComponentMap, Registry},
};

static REGISTRY: RwLock<Option<Registry>> = RwLock::new(None);

/// Create the process-wide registry with the given component map.
///
/// # Errors
///
/// Returns [`RegistryError::AlreadyInitialized`] if a registry already exists.
pub fn initialize(component_map: ComponentMap) -> Result<(), RegistryError> {
    let mut slot = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Err(RegistryError::AlreadyInitialized);
    }
    *slot = Some(Registry::new(component_map));
    Ok(())
}

/// Drop the process-wide registry so it can be initialized again.
pub fn reset() {
    let mut slot = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    *slot = None;
}

pub fn is_initialized() -> bool {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Register a descriptor tree in the process-wide registry.
pub fn register(descriptor: &ComponentDescriptor) -> Result<(), RegistryError> {
    let mut slot = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    slot.as_mut()
        .ok_or(RegistryError::NotInitialized)?
        .register(descriptor)
}

/// Run `f` against the process-wide registry.
pub fn with<R>(f: impl FnOnce(&Registry) -> R) -> Result<R, RegistryError> {
    let slot = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    let registry = slot.as_ref().ok_or(RegistryError::NotInitialized)?;
    Ok(f(registry))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Properties;

    // Single test so the shared state is never touched concurrently.
    #[test]
    fn test_lifecycle() {
        reset();
        assert!(!is_initialized());
        assert!(matches!(
            register(&ComponentDescriptor::new("home")),
            Err(RegistryError::NotInitialized)
        ));
        assert!(with(|_| ()).is_err());

        let map = ComponentMap::new().with("home", |_: &Properties| json!("home"));
        initialize(map.clone()).unwrap();
        assert!(matches!(
            initialize(map.clone()),
            Err(RegistryError::AlreadyInitialized)
        ));

        register(&ComponentDescriptor::new("home").with_path("/")).unwrap();
        assert_eq!(with(|r| r.path_of("home").to_string()).unwrap(), "/");

        reset();
        initialize(map).unwrap();
        assert!(!with(|r| r.has("home")).unwrap());
        reset();
    }
}
