// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use indexmap::IndexMap;
use thiserror::Error;

use crate::Mount;

/// Error returned when a mount can't be registered
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountError {
    /// Another mount already uses this slug
    #[error("a mount is already registered under {slug:?}")]
    DuplicateSlug {
        /// The conflicting slug
        slug: String,
    },

    /// Another mount's slug maps to the same query marker
    #[error("the slug {slug:?} maps to the marker {marker:?}, already used by {existing:?}")]
    DuplicateMarker {
        /// The rejected slug
        slug: String,

        /// The shared marker
        marker: String,

        /// The slug of the mount already using the marker
        existing: String,
    },

    /// The slug can't be used as a path prefix
    #[error("invalid mount slug {slug:?}")]
    InvalidSlug {
        /// The invalid slug
        slug: String,
    },
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('/')
        && !slug.ends_with('/')
        && !slug.contains("//")
        && !slug.chars().any(char::is_whitespace)
}

/// The table of mounted applications, filled once at startup.
///
/// Mounts are kept in registration order. Registering the same slug twice, or
/// two slugs sharing a query marker, is rejected: the first registration stays
/// in place.
#[derive(Debug, Default, Clone)]
pub struct MountRegistry {
    mounts: IndexMap<String, Mount>,
}

impl MountRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new mount
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is invalid or already registered
    pub fn register(&mut self, mount: Mount) -> Result<&Mount, MountError> {
        if !is_valid_slug(&mount.slug) {
            return Err(MountError::InvalidSlug { slug: mount.slug });
        }

        if self.mounts.contains_key(&mount.slug) {
            return Err(MountError::DuplicateSlug { slug: mount.slug });
        }

        let marker = mount.marker();
        if let Some(existing) = self.mounts.values().find(|m| m.marker() == marker) {
            return Err(MountError::DuplicateMarker {
                slug: mount.slug,
                marker,
                existing: existing.slug.clone(),
            });
        }

        for existing in self.mounts.values() {
            let nested_in_existing = mount
                .slug
                .strip_prefix(existing.slug.as_str())
                .and_then(|rest| rest.strip_prefix('/'));
            let nested_in_new = existing
                .slug
                .strip_prefix(mount.slug.as_str())
                .and_then(|rest| rest.strip_prefix('/'));

            if let Some(rest) = nested_in_existing {
                let excluded = existing
                    .excluded_subpaths
                    .iter()
                    .any(|subpath| rest.starts_with(subpath.as_str()));
                tracing::debug!(
                    slug = %mount.slug,
                    parent = %existing.slug,
                    excluded,
                    "Mount is nested under another mount",
                );
            } else if let Some(rest) = nested_in_new {
                let excluded = mount
                    .excluded_subpaths
                    .iter()
                    .any(|subpath| rest.starts_with(subpath.as_str()));
                tracing::debug!(
                    slug = %mount.slug,
                    child = %existing.slug,
                    excluded,
                    "Mount contains another mount",
                );
            }
        }

        tracing::debug!(slug = %mount.slug, root_id = %mount.root_id, access = %mount.access, "Registered mount");

        let entry = self.mounts.entry(mount.slug.clone()).or_insert(mount);
        Ok(entry)
    }

    /// Look up a mount by its slug
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Mount> {
        self.mounts.get(slug)
    }

    /// Check whether a slug is registered
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.mounts.contains_key(slug)
    }

    /// Iterate over the mounts, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Mount> {
        self.mounts.values()
    }

    /// Iterate over the registered slugs, in registration order
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.mounts.keys().map(String::as_str)
    }

    /// Number of registered mounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// Whether no mount is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{Access, MountSource};

    fn mount(slug: &str, root_id: &str) -> Mount {
        Mount::new(
            slug,
            root_id,
            MountSource::parse("/srv/app"),
            Access::Public,
        )
    }

    #[test]
    fn test_duplicate_slug_is_rejected() {
        let mut registry = MountRegistry::new();
        registry.register(mount("app", "first")).unwrap();

        let err = registry.register(mount("app", "second")).unwrap_err();
        assert_matches!(err, MountError::DuplicateSlug { slug } if slug == "app");

        // The first registration stays in place
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("app").unwrap().root_id, "first");
    }

    #[test]
    fn test_shared_marker_is_rejected() {
        let mut registry = MountRegistry::new();
        registry.register(mount("my-app", "first-root")).unwrap();

        for slug in ["my_app", "my.app"] {
            let err = registry.register(mount(slug, "second-root")).unwrap_err();
            assert_matches!(
                err,
                MountError::DuplicateMarker { slug: rejected, marker, existing }
                    if rejected == slug && marker == "spa_mount_my_app" && existing == "my-app"
            );
        }

        assert_eq!(registry.slugs().collect::<Vec<_>>(), ["my-app"]);
        assert_eq!(registry.get("my-app").unwrap().root_id, "first-root");
    }

    #[test]
    fn test_invalid_slugs() {
        let mut registry = MountRegistry::new();
        for slug in ["", "/app", "app/", "a//b", "my app"] {
            assert_matches!(
                registry.register(mount(slug, "root")),
                Err(MountError::InvalidSlug { .. })
            );
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_nested_mounts_are_allowed() {
        let mut registry = MountRegistry::new();
        registry
            .register(mount("app", "root").with_excluded_subpaths(["admin"]))
            .unwrap();
        registry.register(mount("app/admin", "admin-root")).unwrap();

        assert_eq!(registry.slugs().collect::<Vec<_>>(), ["app", "app/admin"]);
        assert!(registry.contains("app/admin"));
        assert!(!registry.contains("admin"));
    }
}
