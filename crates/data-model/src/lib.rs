// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Types describing the single-page applications mounted in the host.

#![allow(clippy::module_name_repetitions)]

mod mount;
mod registry;

pub use self::{
    mount::{Access, Mount, MountAssetOptions, MountSource, PreRenderHook, QueryMode},
    registry::{MountError, MountRegistry},
};
