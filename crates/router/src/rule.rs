// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::fmt;

use regex::Regex;

use crate::QueryVars;

/// A rewrite rule, mapping request paths to query variables.
///
/// Paths are matched without their leading `/` and without query string.
/// A rule can carry an exclusion pattern: a path matching it is not matched by
/// the rule, which stands in for a negative lookahead.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    exclude: Option<Regex>,
    query: Vec<(String, String)>,
}

impl RewriteRule {
    /// Create a new rule
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression
    pub fn new<I, K, V>(pattern: &str, query: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            exclude: None,
            query: query
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    /// Exclude paths matching the given pattern
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression
    pub fn with_exclusion(mut self, exclude: &str) -> Result<Self, regex::Error> {
        self.exclude = Some(Regex::new(exclude)?);
        Ok(self)
    }

    /// The pattern of the rule
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The exclusion pattern of the rule, if any
    #[must_use]
    pub fn exclusion(&self) -> Option<&str> {
        self.exclude.as_ref().map(Regex::as_str)
    }

    /// Whether the rule matches a path
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path) && !self.exclude.as_ref().is_some_and(|e| e.is_match(path))
    }

    /// The query variables a matching path resolves to
    #[must_use]
    pub fn apply(&self, path: &str) -> Option<QueryVars> {
        self.matches(path).then(|| self.query.iter().cloned().collect())
    }
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)?;
        if let Some(exclude) = &self.exclude {
            write!(f, " (except {exclude})")?;
        }

        f.write_str(" => ")?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{k}={v}")?;
        }

        Ok(())
    }
}
