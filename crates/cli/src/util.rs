// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use anyhow::Context;
use mountpoint_config::{
    AssetsConfig, MountConfig, MountQueryMode, MountsConfig, RootConfig, SiteConfig,
};
use mountpoint_data_model::{Access, Mount, MountAssetOptions, MountRegistry, MountSource, QueryMode};
use mountpoint_handlers::{AssetSettings, DefaultShell, PageController, Pipeline};
use mountpoint_http::ClientOptions;

fn mount_from_config(config: &MountConfig) -> Mount {
    let source = match (MountSource::parse(&config.source), &config.base_url) {
        (MountSource::Local { directory, .. }, Some(base_url)) => {
            MountSource::local_with_base_url(directory, base_url.clone())
        }
        (source @ MountSource::Remote { .. }, Some(_)) => {
            tracing::warn!(
                slug = %config.slug,
                "Ignoring the `base_url` of a remote mount"
            );
            source
        }
        (source, None) => source,
    };

    let mut mount = Mount::new(
        config.slug.trim_matches('/'),
        &config.root_id,
        source,
        Access::from_role(&config.role),
    )
    .with_excluded_subpaths(&config.excluded_subpaths)
    .with_assets(MountAssetOptions {
        handle: config.handle.clone(),
        script_dependencies: config.script_dependencies.clone(),
        style_dependencies: config.style_dependencies.clone(),
    });

    if let Some(query_mode) = config.query_mode {
        mount = mount.with_query_mode(match query_mode {
            MountQueryMode::Preserve => QueryMode::Preserve,
            MountQueryMode::Collapse => QueryMode::Collapse,
        });
    }

    mount
}

/// Register every configured mount
pub fn registry_from_config(config: &MountsConfig) -> Result<MountRegistry, anyhow::Error> {
    let mut registry = MountRegistry::new();

    for mount in config.iter() {
        registry
            .register(mount_from_config(mount))
            .with_context(|| format!("could not register the mount {:?}", mount.slug))?;
    }

    Ok(registry)
}

pub fn asset_settings_from_config(config: &AssetsConfig) -> AssetSettings {
    AssetSettings {
        base_url: config.base_url.clone(),
        default_script_dependencies: config.default_script_dependencies.clone(),
        manifest_endpoint_suffix: config.manifest_endpoint_suffix.clone(),
    }
}

pub fn http_client_from_config(config: &AssetsConfig) -> reqwest::Client {
    mountpoint_http::reqwest_client(ClientOptions {
        timeout: config.remote_timeout,
        ..ClientOptions::default()
    })
}

pub fn shell_from_config(config: &SiteConfig) -> DefaultShell {
    DefaultShell::new(&config.title, &config.lang, &config.home_url)
}

/// Build a host pipeline with the page controller of every configured mount
/// installed
pub fn pipeline_from_config(
    config: &RootConfig,
) -> Result<(Pipeline, Arc<PageController>), anyhow::Error> {
    let registry = registry_from_config(&config.mounts)?;

    let controller = Arc::new(PageController::new(
        Arc::new(registry),
        asset_settings_from_config(&config.assets),
        http_client_from_config(&config.assets),
        Arc::new(shell_from_config(&config.site)),
    ));

    let mut pipeline = Pipeline::new();
    controller
        .install(&mut pipeline)
        .context("could not install the rewrite rules")?;

    Ok((pipeline, controller))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_from_config() {
        let mut config = MountConfig::new("/dashboard/", "root", "/srv/apps/dashboard");
        config.base_url = Some("https://cdn.example.com/dashboard/".parse().unwrap());
        config.role = "editor".to_owned();

        let mount = mount_from_config(&config);
        assert_eq!(mount.slug, "dashboard");
        assert_eq!(mount.access, Access::from_role("editor"));
        assert_eq!(mount.query_mode, QueryMode::Preserve);
        assert!(matches!(
            mount.source,
            MountSource::Local {
                base_url: Some(_),
                ..
            }
        ));

        let mut config = MountConfig::new("widgets", "root", "https://widgets.example.com/");
        config.query_mode = Some(MountQueryMode::Preserve);
        let mount = mount_from_config(&config);
        assert!(mount.source.is_remote());
        assert_eq!(mount.query_mode, QueryMode::Preserve);
    }

    #[test]
    fn test_duplicate_mounts() {
        let config = MountsConfig(vec![
            MountConfig::new("app", "root", "/srv/apps/app"),
            MountConfig::new("app", "other", "/srv/apps/other"),
        ]);

        assert!(registry_from_config(&config).is_err());

        let config = MountsConfig(vec![
            MountConfig::new("my-app", "first-root", "/srv/apps/first"),
            MountConfig::new("my_app", "second-root", "/srv/apps/second"),
        ]);

        let error = registry_from_config(&config).unwrap_err();
        assert!(format!("{error:#}").contains("spa_mount_my_app"));
    }
}
