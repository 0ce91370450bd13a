// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use mountpoint_data_model::MountRegistry;

/// Extension point letting the host reserve more top-level slugs
pub trait ReservedSlugs: Send + Sync {
    /// Add, or remove, reserved slugs
    fn extend(&self, reserved: &mut Vec<String>);
}

impl<F> ReservedSlugs for F
where
    F: Fn(&mut Vec<String>) + Send + Sync,
{
    fn extend(&self, reserved: &mut Vec<String>) {
        self(reserved);
    }
}

/// Keeps the host from creating top-level content whose path would be
/// shadowed by a mount.
#[derive(Clone)]
pub struct SlugGuard {
    registry: Arc<MountRegistry>,
    providers: Vec<Arc<dyn ReservedSlugs>>,
}

impl std::fmt::Debug for SlugGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlugGuard")
            .field("registry", &self.registry)
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl SlugGuard {
    /// Guard the slugs of the given registry
    #[must_use]
    pub fn new(registry: Arc<MountRegistry>) -> Self {
        Self {
            registry,
            providers: Vec::new(),
        }
    }

    /// Add a provider of reserved slugs
    #[must_use]
    pub fn with_provider(mut self, provider: impl ReservedSlugs + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// The full list of reserved top-level slugs
    #[must_use]
    pub fn reserved(&self) -> Vec<String> {
        let mut reserved: Vec<String> = self.registry.slugs().map(ToOwned::to_owned).collect();
        for provider in &self.providers {
            provider.extend(&mut reserved);
        }
        reserved
    }

    /// Whether a candidate slug conflicts with a reserved one. Only top-level
    /// slugs are checked.
    #[must_use]
    pub fn is_conflicting(&self, candidate: &str, is_top_level: bool) -> bool {
        is_top_level && self.reserved().iter().any(|slug| slug == candidate)
    }

    /// Host-facing check, combining the host's own verdict with ours
    #[must_use]
    pub fn is_bad_slug(&self, already_bad: bool, candidate: &str, is_top_level: bool) -> bool {
        already_bad || self.is_conflicting(candidate, is_top_level)
    }

    /// Find a free slug for new content the way the host does, by appending
    /// `-2`, `-3`… until the slug is neither taken nor reserved
    #[must_use]
    pub fn unique_slug(
        &self,
        candidate: &str,
        is_top_level: bool,
        is_taken: impl Fn(&str) -> bool,
    ) -> String {
        let is_bad = |slug: &str| self.is_bad_slug(is_taken(slug), slug, is_top_level);

        if !is_bad(candidate) {
            return candidate.to_owned();
        }

        (2_u32..)
            .map(|suffix| format!("{candidate}-{suffix}"))
            .find(|slug| !is_bad(slug))
            .unwrap_or_else(|| candidate.to_owned())
    }
}
