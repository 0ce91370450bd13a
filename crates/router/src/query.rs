// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use indexmap::{IndexMap, IndexSet};

/// The query variables of a request, as understood by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryVars(IndexMap<String, String>);

impl QueryVars {
    /// An empty set of variables
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a variable
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Whether the variable holds a non-zero integer
    #[must_use]
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name)
            .and_then(|value| value.trim().parse::<i64>().ok())
            .is_some_and(|value| value != 0)
    }

    /// Keep only the given variable
    #[must_use]
    pub fn only(&self, name: &str) -> Self {
        self.0
            .get_key_value(name)
            .map(|(k, v)| (k.clone(), v.clone()))
            .into_iter()
            .collect()
    }

    /// Iterate over the variables
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there is no variable
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryVars {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Extend<(String, String)> for QueryVars {
    fn extend<T: IntoIterator<Item = (String, String)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

/// The host's registry of public query variables
pub trait QueryVariables {
    /// Make the host accept a query variable
    fn register(&mut self, name: &str);
}

/// The set of query variable names the host accepts from requests
#[derive(Debug, Clone, Default)]
pub struct QueryVarNames(IndexSet<String>);

impl QueryVariables for QueryVarNames {
    fn register(&mut self, name: &str) {
        if self.0.insert(name.to_owned()) {
            tracing::debug!(name, "Registered query variable");
        }
    }
}

impl QueryVarNames {
    /// Create a registry accepting the given names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Whether a name is accepted
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Iterate over the accepted names
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Parse a raw query string, keeping only the accepted variables
    #[must_use]
    pub fn parse(&self, query: &str) -> QueryVars {
        url::form_urlencoded::parse(query.as_bytes())
            .filter(|(name, _)| self.contains(name))
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        let vars: QueryVars = [("a", "1"), ("b", "0"), ("c", "yes"), ("d", " 2 ")]
            .into_iter()
            .collect();

        assert!(vars.is_truthy("a"));
        assert!(!vars.is_truthy("b"));
        assert!(!vars.is_truthy("c"));
        assert!(vars.is_truthy("d"));
        assert!(!vars.is_truthy("missing"));
    }

    #[test]
    fn test_only() {
        let vars: QueryVars = [("paged", "2"), ("spa_mount_app", "1"), ("p", "42")]
            .into_iter()
            .collect();

        let collapsed = vars.only("spa_mount_app");
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed.get("spa_mount_app"), Some("1"));
        assert!(vars.only("missing").is_empty());
    }

    #[test]
    fn test_parse_keeps_registered_names() {
        let mut names = QueryVarNames::new(["paged"]);
        names.register("spa_mount_app");
        names.register("spa_mount_app");
        assert_eq!(names.iter().count(), 2);

        let vars = names.parse("paged=3&utm_source=mail&spa_mount_app=1");
        assert_eq!(vars.get("paged"), Some("3"));
        assert_eq!(vars.get("spa_mount_app"), Some("1"));
        assert_eq!(vars.get("utm_source"), None);
    }
}
