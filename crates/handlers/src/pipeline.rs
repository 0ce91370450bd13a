// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use mountpoint_router::{QueryVarNames, QueryVariables, RewriteRule, RewriteRules, RouteTable};

use crate::{DispatchHandler, Outcome, ParseRequestHook, Request, RequestLifecycle, Viewer};

/// A minimal host: a rewrite rule table, a set of public query variables, and
/// the request lifecycle hooks.
///
/// Requests go through the rewrite rules, then the parse hooks, then the
/// dispatch handlers. The first handler not passing on the request wins.
#[derive(Default, Clone)]
pub struct Pipeline {
    rules: RewriteRules,
    query_vars: QueryVarNames,
    parse_hooks: Vec<Arc<dyn ParseRequestHook>>,
    dispatchers: Vec<Arc<dyn DispatchHandler>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("rules", &self.rules)
            .field("query_vars", &self.query_vars)
            .field("parse_hooks", &self.parse_hooks.len())
            .field("dispatchers", &self.dispatchers.len())
            .finish()
    }
}

impl RouteTable for Pipeline {
    fn prepend(&mut self, rule: RewriteRule) {
        self.rules.prepend(rule);
    }

    fn add_top(&mut self, rule: RewriteRule) {
        self.rules.add_top(rule);
    }
}

impl QueryVariables for Pipeline {
    fn register(&mut self, name: &str) {
        self.query_vars.register(name);
    }
}

impl RequestLifecycle for Pipeline {
    fn on_parse_request(&mut self, hook: Arc<dyn ParseRequestHook>) {
        self.parse_hooks.push(hook);
    }

    fn on_dispatch(&mut self, handler: Arc<dyn DispatchHandler>) {
        self.dispatchers.push(handler);
    }
}

impl Pipeline {
    /// An empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one of the host's own rewrite rules, tried after every other rule
    pub fn add_host_rule(&mut self, rule: RewriteRule) {
        self.rules.add_host(rule);
    }

    /// The rewrite rule table
    #[must_use]
    pub fn rules(&self) -> &RewriteRules {
        &self.rules
    }

    /// The public query variables
    #[must_use]
    pub fn query_vars(&self) -> &QueryVarNames {
        &self.query_vars
    }

    /// Resolve the query variables of a request.
    ///
    /// Variables from the query string come first, and are overridden by the
    /// ones of the matching rewrite rule.
    #[must_use]
    pub fn parse(&self, uri: &str, viewer: Viewer) -> Request {
        let (path, query_string) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (uri, None),
        };

        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };

        let mut vars = self
            .query_vars
            .parse(query_string.as_deref().unwrap_or_default());

        if let Some(rewritten) = self.rules.resolve(&path) {
            vars.extend(
                rewritten
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned())),
            );
        }

        let mut request = Request {
            path,
            query_string,
            vars,
            viewer,
        };

        for hook in &self.parse_hooks {
            hook.on_parse(&mut request);
        }

        request
    }

    /// Handle a request
    #[tracing::instrument(name = "handlers.pipeline.handle", skip_all, fields(%uri))]
    pub async fn handle(&self, uri: &str, viewer: Viewer) -> Outcome {
        let request = self.parse(uri, viewer);

        for dispatcher in &self.dispatchers {
            match dispatcher.dispatch(&request).await {
                Outcome::Pass => {}
                outcome => return outcome,
            }
        }

        Outcome::Pass
    }
}
