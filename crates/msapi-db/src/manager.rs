//! Lazy connection lifecycle.

use crate::descriptor::ConnectionDescriptor;
use crate::driver::{Driver, Handle, PoolLimits};
use crate::error::DbError;

/// Owns at most one live handle, opened on first use.
///
/// Construction never touches the database. [`ensure_connected`] opens the
/// handle and pings it; [`close`] drops it so the next call opens a fresh
/// one.
///
/// [`ensure_connected`]: ConnectionManager::ensure_connected
/// [`close`]: ConnectionManager::close
pub struct ConnectionManager<D: Driver> {
    driver: D,
    descriptor: ConnectionDescriptor,
    limits: PoolLimits,
    handle: Option<D::Handle>,
}

impl<D: Driver> ConnectionManager<D> {
    pub fn new(driver: D, descriptor: ConnectionDescriptor, limits: PoolLimits) -> Self {
        Self {
            driver,
            descriptor,
            limits,
            handle: None,
        }
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn limits(&self) -> &PoolLimits {
        &self.limits
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns the live handle, opening and pinging one if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if opening or the ping fails. A handle
    /// that fails its ping is dropped, so a retry starts from a clean open.
    pub fn ensure_connected(&mut self) -> Result<&D::Handle, DbError> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => self.connect()?,
        };
        let handle: &D::Handle = self.handle.insert(handle);
        Ok(handle)
    }

    fn connect(&self) -> Result<D::Handle, DbError> {
        let handle = self.driver.open(&self.descriptor, &self.limits)?;
        if let Err(e) = handle.ping() {
            tracing::warn!(
                descriptor = %self.descriptor.redacted(),
                error = %e,
                "database ping failed, discarding handle"
            );
            return Err(match e {
                DbError::Connection(_) => e,
                other => DbError::Connection(Box::new(other)),
            });
        }

        tracing::info!(descriptor = %self.descriptor.redacted(), "database connection established");
        Ok(handle)
    }

    /// Releases the live handle, if any. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            tracing::info!(descriptor = %self.descriptor.redacted(), "database connection closed");
        }
    }
}

impl<D: Driver + std::fmt::Debug> std::fmt::Debug for ConnectionManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("driver", &self.driver)
            .field("descriptor", &self.descriptor)
            .field("limits", &self.limits)
            .field("connected", &self.is_connected())
            .finish()
    }
}
