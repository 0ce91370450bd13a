// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use async_trait::async_trait;
use mountpoint_router::QueryVars;
use mountpoint_spa::Assets;

/// The user making a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    roles: Vec<String>,
}

impl Viewer {
    /// A viewer without any role
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A viewer holding the given roles
    #[must_use]
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// The roles of the viewer
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

/// A request, after the host resolved its query variables
#[derive(Debug, Clone)]
pub struct Request {
    /// The request path, with its leading `/`
    pub path: String,

    /// The raw query string, if any
    pub query_string: Option<String>,

    /// The resolved query variables
    pub vars: QueryVars,

    /// Who is making the request
    pub viewer: Viewer,
}

/// What to do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not handled, the host carries on with its own processing
    Pass,

    /// Send the viewer elsewhere
    Redirect {
        /// Where to send the viewer
        location: String,
    },

    /// Send this page, and stop processing the request
    Render {
        /// The full page
        body: String,
    },
}

/// Runs after the host resolved the query variables of a request, and may
/// rewrite them
pub trait ParseRequestHook: Send + Sync {
    /// Inspect or rewrite the request
    fn on_parse(&self, request: &mut Request);
}

/// Gets a chance to handle a request before the host renders it
#[async_trait]
pub trait DispatchHandler: Send + Sync {
    /// Handle the request, or return [`Outcome::Pass`]
    async fn dispatch(&self, request: &Request) -> Outcome;
}

/// The host's request lifecycle
pub trait RequestLifecycle {
    /// Run a hook once the query variables of a request are resolved
    fn on_parse_request(&mut self, hook: Arc<dyn ParseRequestHook>);

    /// Give a handler a chance to handle requests before the host
    fn on_dispatch(&mut self, handler: Arc<dyn DispatchHandler>);
}

/// The host's page chrome, wrapped around the application root element
pub trait PageShell: Send + Sync {
    /// Everything up to the application root, including the `<head>` tags of
    /// the enqueued assets
    fn header(&self, assets: &Assets) -> String;

    /// Everything after the application root, including the footer scripts
    fn footer(&self, assets: &Assets) -> String;

    /// Where to send viewers who can't access a mount
    fn home_url(&self) -> &str;
}
