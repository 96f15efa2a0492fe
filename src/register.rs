//! One-time registration of the host runtime's serialization bridge.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, ShapeError};
use crate::shape::{Geometry, Shape, UdtDescriptor};

/// Host-side hook that teaches the engine how to move shapes across its
/// runtime boundary.
pub trait RuntimeBridge: Send + Sync {
    fn register_picklers(&self) -> Result<()>;
}

/// Runs the bridge at most once before shape metadata is handed out.
///
/// A failed registration leaves the guard open, so the next caller retries.
pub struct Registration {
    bridge: Option<Arc<dyn RuntimeBridge>>,
    registered: Mutex<bool>,
}

impl Registration {
    pub fn new(bridge: Arc<dyn RuntimeBridge>) -> Self {
        Self {
            bridge: Some(bridge),
            registered: Mutex::new(false),
        }
    }

    /// A registration with no bridge; metadata is produced without side effects.
    pub fn detached() -> Self {
        Self {
            bridge: None,
            registered: Mutex::new(false),
        }
    }

    pub fn is_registered(&self) -> bool {
        *self.guard()
    }

    /// A bridge that panicked never set the flag, so a poisoned lock still
    /// holds an accurate value.
    fn guard(&self) -> MutexGuard<'_, bool> {
        self.registered.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ensure_registered(&self) -> Result<()> {
        let Some(bridge) = &self.bridge else {
            return Ok(());
        };

        let mut done = self.guard();
        if *done {
            return Ok(());
        }

        bridge.register_picklers().inspect_err(|e| {
            tracing::warn!(error = %e, "runtime bridge registration failed");
        })?;
        *done = true;
        tracing::info!("registered shape picklers with runtime bridge");
        Ok(())
    }

    pub fn json_value<S: Shape>(&self, shape: &S) -> Result<UdtDescriptor> {
        self.ensure_registered()?;
        Ok(shape.json_value())
    }

    pub fn describe(&self, geometry: &Geometry) -> Result<UdtDescriptor> {
        self.ensure_registered()?;
        Ok(geometry.json_value())
    }
}

impl Default for Registration {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("has_bridge", &self.bridge.is_some())
            .field("registered", &self.is_registered())
            .finish()
    }
}
