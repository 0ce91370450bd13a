// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use crate::{QueryVars, RewriteRule};

/// The host's table of rewrite rules
pub trait RouteTable {
    /// Insert a rule in front of every other rule
    fn prepend(&mut self, rule: RewriteRule);

    /// Add a rule after the prepended ones, but before the host's own rules
    fn add_top(&mut self, rule: RewriteRule);
}

/// A rewrite rule table.
///
/// Rules are tried in this order: prepended rules, most recent first, then
/// top rules in insertion order, then the host's own rules.
#[derive(Debug, Clone, Default)]
pub struct RewriteRules {
    first: Vec<RewriteRule>,
    top: Vec<RewriteRule>,
    host: Vec<RewriteRule>,
}

impl RouteTable for RewriteRules {
    fn prepend(&mut self, rule: RewriteRule) {
        self.first.insert(0, rule);
    }

    fn add_top(&mut self, rule: RewriteRule) {
        self.top.push(rule);
    }
}

impl RewriteRules {
    /// An empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one of the host's own rules, with the lowest priority
    pub fn add_host(&mut self, rule: RewriteRule) {
        self.host.push(rule);
    }

    /// Iterate over the rules, in priority order
    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.first.iter().chain(&self.top).chain(&self.host)
    }

    /// Resolve a request path to the query variables of the first matching
    /// rule
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<QueryVars> {
        let path = path.trim_start_matches('/');
        self.iter().find_map(|rule| rule.apply(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, name: &str) -> RewriteRule {
        RewriteRule::new(pattern, [(name, "1")]).unwrap()
    }

    #[test]
    fn test_priority() {
        let mut rules = RewriteRules::new();
        rules.add_host(rule("^(.+?)/?$", "pagename"));
        rules.add_top(rule("^app/(.*)$", "catch_all"));
        rules.prepend(rule("^app/?$", "older"));
        rules.prepend(rule("^app/?$", "newer"));

        let patterns: Vec<_> = rules.iter().map(RewriteRule::pattern).collect();
        assert_eq!(patterns, ["^app/?$", "^app/?$", "^app/(.*)$", "^(.+?)/?$"]);

        assert!(rules.resolve("/app").unwrap().is_truthy("newer"));
        assert!(rules.resolve("/app/settings").unwrap().is_truthy("catch_all"));
        assert!(rules.resolve("/about").unwrap().is_truthy("pagename"));
        assert!(rules.resolve("/").is_none());
    }
}
