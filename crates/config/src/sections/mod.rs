// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod assets;
mod mounts;
mod site;

pub use self::{
    assets::AssetsConfig,
    mounts::{MountConfig, MountQueryMode, MountsConfig},
    site::SiteConfig,
};
use crate::util::{ConfigurationSection, SectionError};

/// Application configuration root
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// Configuration of the host site
    #[serde(default, skip_serializing_if = "SiteConfig::is_default")]
    pub site: SiteConfig,

    /// Configuration related to the assets of the mounted applications
    #[serde(default, skip_serializing_if = "AssetsConfig::is_default")]
    pub assets: AssetsConfig,

    /// The mounted applications
    #[serde(default, skip_serializing_if = "MountsConfig::is_default")]
    pub mounts: MountsConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(&self, figment: &figment::Figment) -> Result<(), SectionError> {
        self.site.validate(figment)?;
        self.assets.validate(figment)?;
        self.mounts.validate(figment)?;

        Ok(())
    }
}

impl RootConfig {
    /// A sample configuration, mounting one local application
    #[must_use]
    pub fn sample() -> Self {
        let mut dashboard = MountConfig::new("dashboard", "root", "/srv/apps/dashboard");
        dashboard.excluded_subpaths = vec!["legacy".to_owned()];

        Self {
            mounts: MountsConfig(vec![dashboard]),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        Figment, Jail,
        providers::{Env, Format, Yaml},
    };
    use indoc::indoc;

    use super::*;

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                indoc! {r"
                    site:
                      home_url: https://example.com/
                    mounts:
                      - slug: dashboard
                        root_id: root
                        source: /srv/apps/dashboard
                "},
            )?;
            jail.set_env("MOUNTPOINT_SITE_TITLE", "From the environment");

            let figment = Figment::new()
                .merge(Yaml::file("config.yaml"))
                .merge(Env::prefixed("MOUNTPOINT_").split("_"));
            let config = RootConfig::extract(&figment).map_err(|e| e.to_string())?;

            assert_eq!(config.site.home_url, "https://example.com/");
            assert_eq!(config.site.title, "From the environment");
            assert!(config.assets.is_default());
            assert_eq!(config.mounts.len(), 1);

            Ok(())
        });
    }

    #[test]
    fn empty_config() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "{}")?;

            let config = RootConfig::extract(&Figment::new().merge(Yaml::file("config.yaml")))
                .map_err(|e| e.to_string())?;

            assert!(config.site.is_default());
            assert!(config.mounts.is_empty());

            Ok(())
        });
    }

    #[test]
    fn sample_config() {
        let sample = serde_yaml::to_string(&RootConfig::sample()).unwrap();
        insta::assert_snapshot!(sample, @r"
        mounts:
        - slug: dashboard
          root_id: root
          source: /srv/apps/dashboard
          excluded_subpaths:
          - legacy
        ");
    }
}
