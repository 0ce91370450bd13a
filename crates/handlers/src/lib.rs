// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Serve mounted single-page applications: match the requests captured by
//! their rewrite rules, check access, and render the page shell with the
//! application assets.

mod controller;
mod host;
mod pipeline;
mod shell;

#[cfg(test)]
mod test_utils;

pub use self::{
    controller::{AssetSettings, PageController},
    host::{
        DispatchHandler, Outcome, PageShell, ParseRequestHook, Request, RequestLifecycle, Viewer,
    },
    pipeline::Pipeline,
    shell::DefaultShell,
};
