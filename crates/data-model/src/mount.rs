// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{fmt, sync::Arc};

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use url::Url;

/// Where the build artifacts of a mounted application live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountSource {
    /// A build output directory on the local filesystem
    Local {
        /// The application directory, containing either a `build/` directory
        /// or the build output itself
        directory: Utf8PathBuf,

        /// The public URL of that directory. Inferred from the asset base URL
        /// when not set
        base_url: Option<Url>,
    },

    /// A server exposing an `asset-manifest` endpoint
    Remote {
        /// The base URL of the remote application
        base_url: Url,
    },
}

impl MountSource {
    /// Decide whether a configured source is a local directory or a remote
    /// server.
    ///
    /// Anything that parses as a URL with a host is remote, everything else is
    /// treated as a filesystem path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(base_url) if base_url.host_str().is_some_and(|host| !host.is_empty()) => {
                Self::Remote { base_url }
            }
            _ => Self::Local {
                directory: Utf8PathBuf::from(raw),
                base_url: None,
            },
        }
    }

    /// Create a local source with an explicit public URL
    #[must_use]
    pub fn local_with_base_url(directory: impl Into<Utf8PathBuf>, base_url: Url) -> Self {
        Self::Local {
            directory: directory.into(),
            base_url: Some(base_url),
        }
    }

    /// Returns `true` if the source is served by a remote server
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// The default asset handle for this source, the last component of the
    /// directory or URL path
    #[must_use]
    pub fn default_handle(&self) -> String {
        match self {
            Self::Local { directory, .. } => directory.file_name().unwrap_or_default().to_owned(),
            Self::Remote { base_url } => base_url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                .or_else(|| base_url.host_str())
                .unwrap_or_default()
                .to_owned(),
        }
    }
}

/// Who is allowed to see a mounted application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Anyone, including anonymous viewers
    Public,

    /// Only viewers holding this role
    Role(String),
}

impl Access {
    /// The role name meaning "no role required"
    pub const PUBLIC: &'static str = "public";

    /// Build the access requirement from a role name, mapping the
    /// [`Access::PUBLIC`] sentinel to [`Access::Public`]
    #[must_use]
    pub fn from_role(role: &str) -> Self {
        if role == Self::PUBLIC {
            Self::Public
        } else {
            Self::Role(role.to_owned())
        }
    }

    /// Check whether a viewer holding the given roles is allowed in
    #[must_use]
    pub fn allows<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        match self {
            Self::Public => true,
            Self::Role(required) => roles.iter().any(|role| role.as_ref() == required),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str(Self::PUBLIC),
            Self::Role(role) => f.write_str(role),
        }
    }
}

/// How the query variables of a captured request are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Leave the query variables parsed by the host untouched
    Preserve,

    /// Drop everything but the mount marker, and canonicalize the path
    Collapse,
}

impl QueryMode {
    /// The default mode for a source: remote applications get the collapsed
    /// mode, local ones keep the host's variables
    #[must_use]
    pub const fn for_source(source: &MountSource) -> Self {
        if source.is_remote() {
            Self::Collapse
        } else {
            Self::Preserve
        }
    }
}

/// A callback run right before the page shell is rendered
#[derive(Clone)]
pub struct PreRenderHook(Arc<dyn Fn() + Send + Sync>);

impl PreRenderHook {
    /// Wrap a closure
    pub fn new(hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(hook))
    }

    /// Run the hook
    pub fn call(&self) {
        (self.0)();
    }
}

impl fmt::Debug for PreRenderHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreRenderHook").finish_non_exhaustive()
    }
}

/// Options applied when injecting the assets of a local build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountAssetOptions {
    /// Handle prefix of the assets. Defaults to the source directory name
    pub handle: Option<String>,

    /// Scripts every bundle depends on
    pub script_dependencies: Vec<String>,

    /// Stylesheets every bundle depends on
    pub style_dependencies: Vec<String>,
}

/// A single-page application mounted under a path prefix of the host
#[derive(Debug, Clone)]
pub struct Mount {
    /// The path prefix, relative to the root of the host, without leading or
    /// trailing slashes
    pub slug: String,

    /// The `id` of the element the application mounts itself on
    pub root_id: String,

    /// Where the build artifacts live
    pub source: MountSource,

    /// Who can see the application
    pub access: Access,

    /// Callback fired before the page shell is rendered
    pub pre_render: Option<PreRenderHook>,

    /// Sub-paths of the slug the host should keep serving
    pub excluded_subpaths: Vec<String>,

    /// Asset injection options
    pub assets: MountAssetOptions,

    /// How the query variables of captured requests are handled
    pub query_mode: QueryMode,
}

impl Mount {
    /// Create a new mount, with no pre-render hook, no excluded sub-paths, and
    /// the default query mode for the source
    pub fn new(
        slug: impl Into<String>,
        root_id: impl Into<String>,
        source: MountSource,
        access: Access,
    ) -> Self {
        let query_mode = QueryMode::for_source(&source);
        Self {
            slug: slug.into(),
            root_id: root_id.into(),
            source,
            access,
            pre_render: None,
            excluded_subpaths: Vec::new(),
            assets: MountAssetOptions::default(),
            query_mode,
        }
    }

    /// Set the callback fired before the page shell is rendered
    #[must_use]
    pub fn with_pre_render(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.pre_render = Some(PreRenderHook::new(hook));
        self
    }

    /// Set the sub-paths the host keeps serving
    #[must_use]
    pub fn with_excluded_subpaths<I, S>(mut self, subpaths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_subpaths = subpaths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the asset injection options
    #[must_use]
    pub fn with_assets(mut self, assets: MountAssetOptions) -> Self {
        self.assets = assets;
        self
    }

    /// Override the query mode
    #[must_use]
    pub fn with_query_mode(mut self, query_mode: QueryMode) -> Self {
        self.query_mode = query_mode;
        self
    }

    /// The name of the query variable flagging requests for this mount
    #[must_use]
    pub fn marker(&self) -> String {
        let slug: String = self
            .slug
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        format!("spa_mount_{slug}")
    }

    /// The asset handle prefix
    #[must_use]
    pub fn handle(&self) -> String {
        self.assets
            .handle
            .clone()
            .unwrap_or_else(|| self.source.default_handle())
    }
}
