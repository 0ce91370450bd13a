// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{collections::HashSet, ops::Deref};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::Error as _};
use url::Url;

use crate::{ConfigurationSection, SectionError};

fn default_role() -> String {
    "public".to_owned()
}

fn is_default_role(value: &str) -> bool {
    value == "public"
}

/// How the host's query variables are treated on the paths of a mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MountQueryMode {
    /// `preserve`: the host's query variables are left alone
    Preserve,

    /// `collapse`: every query variable but the mount marker is dropped, and
    /// non-canonical paths are redirected
    Collapse,
}

/// A single-page application mounted under a slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MountConfig {
    /// The path under which the application is served, without leading or
    /// trailing slash
    pub slug: String,

    /// The `id` of the element the application renders into
    pub root_id: String,

    /// Either a local directory holding the application build, or the URL of
    /// a server exposing an `asset-manifest` endpoint
    pub source: String,

    /// The public URL of a local application directory. Inferred from
    /// `assets.base_url` when not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,

    /// The role viewers need to access the application. Defaults to `public`,
    /// which lets everyone in.
    #[serde(default = "default_role", skip_serializing_if = "is_default_role")]
    pub role: String,

    /// Sub-paths which are left to the host
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_subpaths: Vec<String>,

    /// How the host's query variables are treated. Defaults to `collapse` for
    /// remote applications and `preserve` for local ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_mode: Option<MountQueryMode>,

    /// Prefix of the handles of the application assets. Defaults to the last
    /// component of the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    /// Scripts the application scripts depend on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script_dependencies: Vec<String>,

    /// Stylesheets the application stylesheets depend on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_dependencies: Vec<String>,
}

impl MountConfig {
    /// A mount of a local application, with every option left to its default
    #[must_use]
    pub fn new(
        slug: impl Into<String>,
        root_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            root_id: root_id.into(),
            source: source.into(),
            base_url: None,
            role: default_role(),
            excluded_subpaths: Vec::new(),
            query_mode: None,
            handle: None,
            script_dependencies: Vec::new(),
            style_dependencies: Vec::new(),
        }
    }
}

/// The mounted applications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MountsConfig(pub Vec<MountConfig>);

impl Deref for MountsConfig {
    type Target = Vec<MountConfig>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MountsConfig {
    /// Returns true if the configuration is the default one
    pub(crate) fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

impl ConfigurationSection for MountsConfig {
    const PATH: Option<&'static str> = Some("mounts");

    fn validate(&self, figment: &figment::Figment) -> Result<(), SectionError> {
        let mut slugs = HashSet::new();

        for (index, mount) in self.0.iter().enumerate() {
            let annotate = |mut error: figment::Error| {
                error.metadata = figment.find_metadata(Self::PATH.unwrap()).cloned();
                error.profile = Some(figment::Profile::Default);
                error.path = vec![Self::PATH.unwrap().to_owned(), index.to_string()];
                error
            };

            let slug = mount.slug.trim_matches('/');
            if slug.is_empty() {
                return Err(annotate(figment::Error::custom("The `slug` must not be empty")).into());
            }

            if !slugs.insert(slug) {
                return Err(annotate(figment::Error::custom(format!(
                    "The slug {slug:?} is already used by another mount"
                )))
                .into());
            }

            if mount.root_id.trim().is_empty() {
                return Err(
                    annotate(figment::Error::custom("The `root_id` must not be empty")).into(),
                );
            }

            if mount.source.trim().is_empty() {
                return Err(annotate(figment::Error::missing_field("source")).into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        Figment, Jail,
        providers::{Format, Yaml},
    };
    use indoc::indoc;

    use super::*;

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                indoc! {r"
                    mounts:
                      - slug: dashboard
                        root_id: root
                        source: /srv/apps/dashboard
                        excluded_subpaths: [legacy]
                        script_dependencies: [react]
                      - slug: widgets
                        root_id: widgets-root
                        source: https://widgets.example.com/
                        role: administrator
                        query_mode: preserve
                "},
            )?;

            let config = MountsConfig::extract(&Figment::new().merge(Yaml::file("config.yaml")))
                .map_err(|e| e.to_string())?;

            assert_eq!(config.len(), 2);

            let dashboard = &config[0];
            assert_eq!(dashboard.slug, "dashboard");
            assert_eq!(dashboard.role, "public");
            assert_eq!(dashboard.excluded_subpaths, ["legacy"]);
            assert_eq!(dashboard.query_mode, None);

            let widgets = &config[1];
            assert_eq!(widgets.role, "administrator");
            assert_eq!(widgets.query_mode, Some(MountQueryMode::Preserve));

            Ok(())
        });
    }

    #[test]
    fn duplicate_slug() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                indoc! {r"
                    mounts:
                      - slug: dashboard
                        root_id: root
                        source: /srv/apps/dashboard
                      - slug: /dashboard/
                        root_id: other
                        source: /srv/apps/other
                "},
            )?;

            let error = MountsConfig::extract(&Figment::new().merge(Yaml::file("config.yaml")))
                .unwrap_err();
            assert!(error.to_string().contains("already used by another mount"));

            Ok(())
        });
    }

    #[test]
    fn empty_root_id() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                indoc! {r#"
                    mounts:
                      - slug: dashboard
                        root_id: ""
                        source: /srv/apps/dashboard
                "#},
            )?;

            let error = MountsConfig::extract(&Figment::new().merge(Yaml::file("config.yaml")))
                .unwrap_err();
            assert!(error.to_string().contains("root_id"));

            Ok(())
        });
    }
}
