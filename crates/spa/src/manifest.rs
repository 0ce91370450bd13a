// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Name of the manifest file written by the build tool
pub const MANIFEST_FILE: &str = "asset-manifest.json";

/// Name of the build output directory, checked before the application root
pub const BUILD_DIRECTORY: &str = "build";

/// The entrypoints listed in an asset manifest.
///
/// Depending on the version of the build tool, this is either a map of
/// logical names to paths, or a plain list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Entrypoints {
    /// Logical name to path or URL
    Named(IndexMap<String, String>),

    /// Ordered list of paths or URLs
    List(Vec<String>),
}

impl Entrypoints {
    /// The referenced paths or URLs, in manifest order
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        match self {
            Self::Named(map) => map.values().map(String::as_str).collect(),
            Self::List(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

/// An asset manifest, as written by the build tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    /// The entrypoints of the application
    pub entrypoints: Entrypoints,

    /// Every file emitted by the build, keyed by logical name. Only kept for
    /// reporting, values are left as they were written.
    pub files: IndexMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawManifest {
    entrypoints: Option<Entrypoints>,

    #[serde(default)]
    files: IndexMap<String, serde_json::Value>,
}

impl AssetManifest {
    /// Parse a manifest file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is empty, not valid JSON, or has no
    /// `entrypoints` field
    pub fn parse(path: &Utf8Path, contents: &[u8]) -> Result<Self, ManifestError> {
        if contents.iter().all(u8::is_ascii_whitespace) {
            return Err(ManifestError::NotFound {
                path: path.to_owned(),
            });
        }

        let raw: RawManifest =
            serde_json::from_slice(contents).map_err(|source| ManifestError::Invalid {
                path: path.to_owned(),
                source,
            })?;

        let entrypoints = raw.entrypoints.ok_or_else(|| ManifestError::Malformed {
            path: path.to_owned(),
        })?;

        Ok(Self {
            entrypoints,
            files: raw.files,
        })
    }
}

/// Which of the two candidate locations held the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestLocation {
    /// `<directory>/build/asset-manifest.json`
    Build,

    /// `<directory>/asset-manifest.json`
    Root,
}

impl ManifestLocation {
    /// The prefix to add to every reference found in a manifest at this
    /// location
    #[must_use]
    pub const fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Build => Some(BUILD_DIRECTORY),
            Self::Root => None,
        }
    }
}

/// A manifest loaded from a local application directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalManifest {
    /// Where the manifest was found
    pub location: ManifestLocation,

    /// Path of the manifest file
    pub path: Utf8PathBuf,

    /// The parsed manifest
    pub manifest: AssetManifest,
}

impl LocalManifest {
    /// The entrypoint references, relative to the application directory
    #[must_use]
    pub fn references(&self) -> Vec<String> {
        let prefix = self.location.prefix();
        self.manifest
            .entrypoints
            .references()
            .into_iter()
            .map(|reference| match prefix {
                Some(prefix) => format!("{prefix}/{reference}"),
                None => reference.to_owned(),
            })
            .collect()
    }
}

/// Error returned when a local manifest can't be resolved
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No manifest at the authoritative location, or an empty one
    #[error("no asset manifest found at {path}")]
    NotFound {
        /// The path that was checked
        path: Utf8PathBuf,
    },

    /// The manifest has no `entrypoints` field
    #[error(
        "asset manifest {path} has no entrypoints, the application may be built with an unsupported version of react-scripts (3.2.0 or later is required)"
    )]
    Malformed {
        /// The manifest path
        path: Utf8PathBuf,
    },

    /// The manifest is not valid JSON
    #[error("asset manifest {path} is not valid")]
    Invalid {
        /// The manifest path
        path: Utf8PathBuf,

        /// The underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The manifest could not be read
    #[error("failed to read asset manifest {path}")]
    Io {
        /// The manifest path
        path: Utf8PathBuf,

        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    /// Whether this is the silent "no manifest" case
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Find and parse the asset manifest of a local application.
///
/// The `build/` sub-directory is checked first. If it holds no manifest, the
/// manifest at the root of the directory is used instead. Only one of the two
/// is ever read.
///
/// # Errors
///
/// Returns an error if no manifest is found, if it can't be read, or if it is
/// not a valid manifest.
#[tracing::instrument(name = "spa.manifest.resolve_local", skip_all, fields(%directory))]
pub async fn resolve_local(directory: &Utf8Path) -> Result<LocalManifest, ManifestError> {
    let build_path = directory.join(BUILD_DIRECTORY).join(MANIFEST_FILE);

    let location = if tokio::fs::try_exists(&build_path).await.unwrap_or(false) {
        ManifestLocation::Build
    } else {
        ManifestLocation::Root
    };

    let path = match location {
        ManifestLocation::Build => build_path,
        ManifestLocation::Root => directory.join(MANIFEST_FILE),
    };

    tracing::debug!(%path, ?location, "Loading asset manifest");

    let contents = match tokio::fs::read(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::NotFound { path });
        }
        Err(source) => return Err(ManifestError::Io { path, source }),
    };

    let manifest = AssetManifest::parse(&path, &contents)?;

    Ok(LocalManifest {
        location,
        path,
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    use super::*;

    fn app_dir() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    const MANIFEST: &str = r#"{
        "files": {
            "main.js": "static/js/main.abc123.js",
            "main.js.map": "static/js/main.abc123.js.map"
        },
        "entrypoints": {
            "main.js": "static/js/main.abc123.js",
            "main.css": "static/css/main.def456.css"
        }
    }"#;

    #[tokio::test]
    async fn test_build_manifest_is_prefixed() {
        let (_guard, dir) = app_dir();
        std::fs::create_dir(dir.join("build")).unwrap();
        std::fs::write(dir.join("build/asset-manifest.json"), MANIFEST).unwrap();

        let manifest = resolve_local(&dir).await.unwrap();
        assert_eq!(manifest.location, ManifestLocation::Build);
        assert_eq!(
            manifest.references(),
            [
                "build/static/js/main.abc123.js",
                "build/static/css/main.def456.css"
            ]
        );
    }

    #[tokio::test]
    async fn test_root_manifest_is_not_prefixed() {
        let (_guard, dir) = app_dir();
        std::fs::write(dir.join("asset-manifest.json"), MANIFEST).unwrap();

        let manifest = resolve_local(&dir).await.unwrap();
        assert_eq!(manifest.location, ManifestLocation::Root);
        assert_eq!(
            manifest.references(),
            ["static/js/main.abc123.js", "static/css/main.def456.css"]
        );
        assert_eq!(manifest.manifest.files.len(), 2);
    }

    #[test]
    fn test_files_are_not_interpreted() {
        let manifest = AssetManifest::parse(
            Utf8Path::new("asset-manifest.json"),
            br#"{
                "files": {"main.js": "static/js/main.js", "meta": {"hash": 1}, "count": 2},
                "entrypoints": ["static/js/main.js"]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.files.len(), 3);
        assert_eq!(manifest.files["meta"], serde_json::json!({"hash": 1}));
        assert_matches!(manifest.entrypoints, Entrypoints::List(ref list) if list == &["static/js/main.js"]);
    }

    #[tokio::test]
    async fn test_build_manifest_wins_without_merging() {
        let (_guard, dir) = app_dir();
        std::fs::create_dir(dir.join("build")).unwrap();
        std::fs::write(
            dir.join("build/asset-manifest.json"),
            r#"{"entrypoints": ["static/js/bundle.js"]}"#,
        )
        .unwrap();
        std::fs::write(dir.join("asset-manifest.json"), MANIFEST).unwrap();

        let manifest = resolve_local(&dir).await.unwrap();
        assert_eq!(manifest.references(), ["build/static/js/bundle.js"]);
    }

    #[tokio::test]
    async fn test_list_entrypoints() {
        let (_guard, dir) = app_dir();
        std::fs::write(
            dir.join("asset-manifest.json"),
            r#"{"entrypoints": ["static/js/runtime-main.1.js", "static/js/main.2.js"]}"#,
        )
        .unwrap();

        let manifest = resolve_local(&dir).await.unwrap();
        assert_eq!(
            manifest.references(),
            ["static/js/runtime-main.1.js", "static/js/main.2.js"]
        );
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let (_guard, dir) = app_dir();
        let err = resolve_local(&dir).await.unwrap_err();
        assert!(err.is_not_found());

        // An empty file is treated the same way
        std::fs::write(dir.join("asset-manifest.json"), "  \n").unwrap();
        let err = resolve_local(&dir).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_and_invalid_manifests() {
        let (_guard, dir) = app_dir();
        std::fs::write(
            dir.join("asset-manifest.json"),
            r#"{"files": {"main.js": "static/js/main.js"}}"#,
        )
        .unwrap();
        let err = resolve_local(&dir).await.unwrap_err();
        assert_matches!(err, ManifestError::Malformed { .. });

        std::fs::write(dir.join("asset-manifest.json"), "{not json").unwrap();
        let err = resolve_local(&dir).await.unwrap_err();
        assert_matches!(err, ManifestError::Invalid { .. });
        assert!(!err.is_not_found());
    }
}
