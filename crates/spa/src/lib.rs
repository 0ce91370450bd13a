// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

//! A crate to help serve single-page apps built by `react-scripts`: find
//! their asset manifest, and turn it into script and stylesheet inclusions.

mod assets;
mod inject;
pub mod manifest;
mod remote;
mod uri;

pub use self::{
    assets::{AssetQueue, Assets, ScriptDirective, StyleDirective},
    inject::{
        AssetKind, AssetRole, InjectOptions, ResolvedAsset, inject, inject_remote, resolve,
        sanitize_key,
    },
    manifest::{AssetManifest, LocalManifest, ManifestError, ManifestLocation, resolve_local},
    remote::{REMOTE_MANIFEST_ENDPOINT, RemoteFetchError, fetch_remote, manifest_url},
    uri::{infer_base_url, to_uri, trailing_slash},
};
