// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use async_trait::async_trait;
use mountpoint_data_model::{Mount, MountRegistry, MountSource, QueryMode};
use mountpoint_router::{
    QueryVariables, QueryVars, RouteError, RouteTable, canonical_path, collapse_query,
    register_all,
};
use mountpoint_spa::{
    Assets, InjectOptions, fetch_remote, infer_base_url, inject, inject_remote, resolve_local,
    trailing_slash,
};
use url::Url;

use crate::{DispatchHandler, Outcome, PageShell, ParseRequestHook, Request, RequestLifecycle};

/// Host-wide settings used to resolve the assets of mounted applications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSettings {
    /// The public URL under which local application directories are served
    pub base_url: Url,

    /// Script dependencies added to every local application
    pub default_script_dependencies: Vec<String>,

    /// Appended to the remote manifest endpoint path
    pub manifest_endpoint_suffix: String,
}

impl AssetSettings {
    /// Settings with no default dependency and no endpoint suffix
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            default_script_dependencies: Vec::new(),
            manifest_endpoint_suffix: String::new(),
        }
    }
}

/// Serves the page shell of mounted applications
pub struct PageController {
    registry: Arc<MountRegistry>,
    settings: AssetSettings,
    http_client: reqwest::Client,
    shell: Arc<dyn PageShell>,
}

impl std::fmt::Debug for PageController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PageController {
    /// Create a new controller
    #[must_use]
    pub fn new(
        registry: Arc<MountRegistry>,
        settings: AssetSettings,
        http_client: reqwest::Client,
        shell: Arc<dyn PageShell>,
    ) -> Self {
        Self {
            registry,
            settings,
            http_client,
            shell,
        }
    }

    /// The mounts served by this controller
    #[must_use]
    pub fn registry(&self) -> &Arc<MountRegistry> {
        &self.registry
    }

    /// Install the rewrite rules of every mount, and hook the controller in the
    /// request lifecycle of the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules of a mount could not be built. The host is
    /// left untouched in that case.
    pub fn install<H>(self: &Arc<Self>, host: &mut H) -> Result<(), RouteError>
    where
        H: RouteTable + QueryVariables + RequestLifecycle,
    {
        register_all(&self.registry, host)?;
        host.on_parse_request(Arc::new(CollapseQuery {
            registry: Arc::clone(&self.registry),
        }));
        host.on_dispatch(Arc::clone(self) as Arc<dyn DispatchHandler>);

        tracing::info!(mounts = self.registry.len(), "Installed mounted applications");
        Ok(())
    }

    /// Find the mount capturing a request
    #[must_use]
    pub fn matched(&self, vars: &QueryVars) -> Option<&Mount> {
        self.registry
            .iter()
            .find(|mount| vars.is_truthy(&mount.marker()))
    }

    /// Resolve the assets of a mount.
    ///
    /// Failures are logged, and result in an empty set of assets.
    #[tracing::instrument(name = "handlers.controller.assets", skip_all, fields(slug = %mount.slug))]
    pub async fn assets(&self, mount: &Mount) -> Assets {
        let mut assets = Assets::new();

        match &mount.source {
            MountSource::Local {
                directory,
                base_url,
            } => {
                let manifest = match resolve_local(directory).await {
                    Ok(manifest) => manifest,
                    Err(e) if e.is_not_found() => {
                        tracing::debug!(
                            error = &e as &dyn std::error::Error,
                            "No asset manifest, rendering without assets"
                        );
                        return assets;
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = &e as &dyn std::error::Error,
                            "Could not load the asset manifest, rendering without assets"
                        );
                        return assets;
                    }
                };

                let base_url = match base_url {
                    Some(base_url) => trailing_slash(base_url.as_str()),
                    None => infer_base_url(directory, &self.settings.base_url),
                };

                let mut script_dependencies = self.settings.default_script_dependencies.clone();
                script_dependencies.extend(mount.assets.script_dependencies.iter().cloned());

                let options = InjectOptions {
                    base_url,
                    handle: mount.handle(),
                    script_dependencies,
                    style_dependencies: mount.assets.style_dependencies.clone(),
                };

                inject(&manifest.references(), &options, &mut assets);
            }

            MountSource::Remote { base_url } => {
                match fetch_remote(
                    &self.http_client,
                    base_url,
                    &self.settings.manifest_endpoint_suffix,
                )
                .await
                {
                    Ok(urls) => inject_remote(&urls, &mut assets),
                    Err(e) => {
                        tracing::debug!(
                            error = &e as &dyn std::error::Error,
                            "Could not fetch the remote asset manifest, rendering without assets"
                        );
                    }
                }
            }
        }

        assets
    }

    /// Handle a request, rendering the page shell if a mount captures it
    #[tracing::instrument(
        name = "handlers.controller.handle",
        skip_all,
        fields(path = %request.path, mount.slug = tracing::field::Empty),
    )]
    pub async fn handle(&self, request: &Request) -> Outcome {
        let Some(mount) = self.matched(&request.vars) else {
            return Outcome::Pass;
        };

        tracing::Span::current().record("mount.slug", mount.slug.as_str());

        if !mount.access.allows(request.viewer.roles()) {
            tracing::debug!(access = %mount.access, "Viewer is not allowed to access the mount");
            return Outcome::Redirect {
                location: self.shell.home_url().to_owned(),
            };
        }

        if mount.query_mode == QueryMode::Collapse {
            let canonical = canonical_path(&request.path);
            if canonical != request.path {
                let location = match &request.query_string {
                    Some(query) => format!("{canonical}?{query}"),
                    None => canonical,
                };
                return Outcome::Redirect { location };
            }
        }

        let assets = self.assets(mount).await;

        if let Some(hook) = &mount.pre_render {
            hook.call();
        }

        let body = format!(
            "{}<div id='{}'></div>{}",
            self.shell.header(&assets),
            mount.root_id,
            self.shell.footer(&assets),
        );

        Outcome::Render { body }
    }
}

#[async_trait]
impl DispatchHandler for PageController {
    async fn dispatch(&self, request: &Request) -> Outcome {
        self.handle(request).await
    }
}

/// Drops the host's query variables from requests captured by a mount in
/// collapsed mode
struct CollapseQuery {
    registry: Arc<MountRegistry>,
}

impl ParseRequestHook for CollapseQuery {
    fn on_parse(&self, request: &mut Request) {
        let collapsed = self
            .registry
            .iter()
            .find_map(|mount| collapse_query(mount, &request.vars));

        if let Some(vars) = collapsed {
            request.vars = vars;
        }
    }
}
