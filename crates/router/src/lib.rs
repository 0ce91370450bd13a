// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Rewrite rules capturing the paths of mounted applications, and the guard
//! keeping host content from shadowing them.

mod query;
mod registrar;
mod rule;
mod slug_guard;
mod table;

pub use self::{
    query::{QueryVarNames, QueryVariables, QueryVars},
    registrar::{
        MountRoutes, RouteError, canonical_path, collapse_query, register_all, register_mount,
    },
    rule::RewriteRule,
    slug_guard::{ReservedSlugs, SlugGuard},
    table::{RewriteRules, RouteTable},
};
