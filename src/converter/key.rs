// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! Keys identifying cluster objects and sub-resources.

use crate::constants::TRANSLATION_VERSION;
use crate::errors::KeyError;
use crate::identity::id_for_key;
use std::fmt;
use uuid::Uuid;

/// `(kind, namespace, name)` of a cluster object or of a sub-resource.
///
/// Cluster-scoped objects have an empty namespace. Sub-resource keys carry the
/// sub-resource kind and extend the parent's name (e.g. `web/http/10.0.0.5/8080/TCP`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl Key {
    #[must_use]
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse a flat client key (`namespace/name`, or `name` for cluster-scoped kinds).
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the key has more than one `/` or an empty name.
    pub fn from_client_key(kind: &str, client_key: &str) -> Result<Self, KeyError> {
        let invalid = |reason: &str| KeyError::Invalid {
            kind: kind.to_string(),
            key: client_key.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = client_key.split('/').collect();
        let (namespace, name) = match parts.as_slice() {
            [name] => ("", *name),
            [namespace, name] => (*namespace, *name),
            _ => return Err(invalid("expected 'name' or 'namespace/name'")),
        };
        if name.is_empty() {
            return Err(invalid("empty name"));
        }
        Ok(Self::new(kind, namespace, name))
    }

    /// The flat client key this key was parsed from.
    #[must_use]
    pub fn client_key(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    /// Key of a sub-resource of this object: same namespace, `suffix` appended to the name.
    #[must_use]
    pub fn sub(&self, kind: &str, suffix: &str) -> Self {
        Self::new(kind, self.namespace.clone(), format!("{}/{suffix}", self.name))
    }

    /// Versioned name hashed into [`Key::id`], e.g. `pod.1.default/web-0`.
    #[must_use]
    pub fn translation_name(&self) -> String {
        format!(
            "{}.{TRANSLATION_VERSION}.{}",
            self.kind.to_lowercase(),
            self.client_key()
        )
    }

    /// Backend id of the object this key identifies.
    #[must_use]
    pub fn id(&self) -> Uuid {
        id_for_key(&self.translation_name())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.client_key())
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod key_tests;
