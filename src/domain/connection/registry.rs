//! Connection registry - the fixed, ordered list of mock connections

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

/// A mock external account the user can link
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub soul_points: u32,
    #[serde(default)]
    pub url: String,
}

impl ConnectionDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        description: impl Into<String>,
        soul_points: u32,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            description: description.into(),
            soul_points,
            url: url.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry has no connections")]
    Empty,
    #[error("connection #{index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate connection id `{0}`")]
    DuplicateId(String),
}

/// Read-only, ordered set of connection definitions
#[derive(Debug, Clone)]
pub struct ConnectionRegistry {
    definitions: Vec<ConnectionDefinition>,
}

impl ConnectionRegistry {
    pub fn new(definitions: Vec<ConnectionDefinition>) -> Result<Self, RegistryError> {
        if definitions.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::new();
        for (index, def) in definitions.iter().enumerate() {
            if def.id.trim().is_empty() {
                return Err(RegistryError::EmptyId { index });
            }
            if !seen.insert(def.id.as_str()) {
                return Err(RegistryError::DuplicateId(def.id.clone()));
            }
        }
        Ok(Self { definitions })
    }

    /// Lookup by id. Unknown ids return `None`.
    pub fn get(&self, id: &str) -> Option<&ConnectionDefinition> {
        self.definitions.iter().find(|def| def.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.definitions.iter().position(|def| def.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionDefinition> {
        self.definitions.iter()
    }

    pub fn definitions(&self) -> &[ConnectionDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Sum of every reward in the registry
    pub fn total_points(&self) -> u64 {
        self.definitions
            .iter()
            .map(|def| u64::from(def.soul_points))
            .sum()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self {
            definitions: default_connections(),
        }
    }
}

pub fn default_connections() -> Vec<ConnectionDefinition> {
    vec![
        ConnectionDefinition::new(
            "sibilScore",
            "Sibil Score",
            "📊",
            "Connect your Sibil Score to boost your reputation.",
            150,
            "https://sibil.example.com/connect",
        ),
        ConnectionDefinition::new(
            "mAdhar",
            "mAdhar",
            "🆔",
            "Verify your identity with mAdhar.",
            100,
            "https://madhar.example.com/verify",
        ),
        ConnectionDefinition::new(
            "google",
            "Google",
            "G",
            "Connect to Google to verify your email address.",
            30,
            "https://accounts.google.com/oauth",
        ),
        ConnectionDefinition::new(
            "x",
            "X",
            "𝕏",
            "Connect to X to verify your social media presence.",
            30,
            "https://x.com/oauth",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str) -> ConnectionDefinition {
        ConnectionDefinition::new(id, id.to_uppercase(), "", "", 10, "")
    }

    #[test]
    fn test_default_registry_order() {
        let registry = ConnectionRegistry::default();
        let ids: Vec<&str> = registry.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["sibilScore", "mAdhar", "google", "x"]);
        assert_eq!(registry.total_points(), 310);
    }

    #[test]
    fn test_lookup() {
        let registry = ConnectionRegistry::default();
        assert_eq!(registry.get("google").map(|d| d.soul_points), Some(30));
        assert!(registry.get("github").is_none());
        assert_eq!(registry.position("mAdhar"), Some(1));
    }

    #[test]
    fn test_rejects_bad_definitions() {
        assert_eq!(
            ConnectionRegistry::new(vec![]).unwrap_err(),
            RegistryError::Empty
        );
        assert_eq!(
            ConnectionRegistry::new(vec![def("a"), def(" ")]).unwrap_err(),
            RegistryError::EmptyId { index: 1 }
        );
        assert_eq!(
            ConnectionRegistry::new(vec![def("a"), def("b"), def("a")]).unwrap_err(),
            RegistryError::DuplicateId("a".to_string())
        );
    }
}
