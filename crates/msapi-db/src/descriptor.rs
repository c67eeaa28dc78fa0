//! Connection descriptors.

use std::fmt;

/// The encoded credential and location string used to open a database.
///
/// The string is opaque to the executor and handed to the driver verbatim.
/// It is fixed once constructed.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ConnectionDescriptor(String);

impl ConnectionDescriptor {
    /// Environment variable holding the process-wide default descriptor.
    pub const ENV_VAR: &'static str = "dbaccessPath";

    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into())
    }

    /// Builds a descriptor from its parts.
    ///
    /// Format: `username:password@tcp(host:port)/database?charset=utf8`
    pub fn from_parts(username: &str, password: &str, host: &str, port: &str, database: &str) -> Self {
        Self(format!(
            "{username}:{password}@tcp({host}:{port})/{database}?charset=utf8"
        ))
    }

    /// Reads the default descriptor from [`Self::ENV_VAR`].
    ///
    /// The variable is read once, here. An unset variable yields an empty
    /// placeholder that fails with a connection error on first use.
    pub fn from_env() -> Self {
        Self::from_env_var(Self::ENV_VAR)
    }

    /// Reads the descriptor from the named environment variable.
    pub fn from_env_var(name: &str) -> Self {
        match std::env::var(name) {
            Ok(value) => Self(value),
            Err(_) => {
                tracing::debug!(var = name, "descriptor variable not set, using placeholder");
                Self::default()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the placeholder descriptor.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The descriptor with any `user:password@` password masked.
    pub fn redacted(&self) -> String {
        let Some(at) = self.0.rfind('@') else {
            return self.0.clone();
        };
        let (credentials, rest) = self.0.split_at(at);
        match credentials.split_once(':') {
            Some((user, _)) => format!("{user}:[REDACTED]{rest}"),
            None => self.0.clone(),
        }
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionDescriptor")
            .field(&self.redacted())
            .finish()
    }
}

impl From<String> for ConnectionDescriptor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ConnectionDescriptor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_builds_tcp_descriptor() {
        let descriptor = ConnectionDescriptor::from_parts("a", "b", "127.0.0.1", "3306", "t");
        assert_eq!(descriptor.as_str(), "a:b@tcp(127.0.0.1:3306)/t?charset=utf8");
    }

    #[test]
    fn debug_masks_password() {
        let descriptor =
            ConnectionDescriptor::from_parts("svc", "hunter2", "db.internal", "3306", "orders");
        let rendered = format!("{descriptor:?}");
        assert!(!rendered.contains("hunter2"), "password leaked: {rendered}");
        assert!(rendered.contains("svc:[REDACTED]@tcp(db.internal:3306)/orders"));
    }

    #[test]
    fn redacted_leaves_plain_paths_alone() {
        let descriptor = ConnectionDescriptor::new("/var/lib/msapi/app.db");
        assert_eq!(descriptor.redacted(), "/var/lib/msapi/app.db");
    }

    #[test]
    fn unset_env_var_yields_placeholder() {
        let descriptor = ConnectionDescriptor::from_env_var("MSAPI_TEST_DESCRIPTOR_NEVER_SET");
        assert!(descriptor.is_empty());
    }

    #[test]
    fn env_var_is_read_at_construction() {
        let name = "MSAPI_TEST_DESCRIPTOR_READ_ONCE";
        std::env::set_var(name, "first.db");
        let descriptor = ConnectionDescriptor::from_env_var(name);
        std::env::set_var(name, "second.db");

        assert_eq!(descriptor.as_str(), "first.db");
        std::env::remove_var(name);
    }
}
