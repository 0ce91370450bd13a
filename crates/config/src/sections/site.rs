// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ConfigurationSection;

fn default_home_url() -> String {
    "/".to_owned()
}

fn default_lang() -> String {
    "en".to_owned()
}

/// Configuration of the host site
#[derive(Clone, Debug, Deserialize, JsonSchema, Serialize, PartialEq, Eq)]
pub struct SiteConfig {
    /// Where viewers who can't access a mount are sent. Defaults to `/`.
    #[serde(default = "default_home_url")]
    pub home_url: String,

    /// Title of the rendered pages
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// Language of the rendered pages. Defaults to `en`.
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            title: String::new(),
            lang: default_lang(),
        }
    }
}

impl SiteConfig {
    /// Returns true if the configuration is the default one
    pub(crate) fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ConfigurationSection for SiteConfig {
    const PATH: Option<&'static str> = Some("site");
}

#[cfg(test)]
mod tests {
    use figment::{
        Figment, Jail,
        providers::{Format, Yaml},
    };

    use super::*;
    use crate::ConfigurationSectionExt;

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    site:
                      title: My site
                ",
            )?;

            let config = SiteConfig::extract_or_default(
                &Figment::new().merge(Yaml::file("config.yaml")),
            )
            .map_err(|e| e.to_string())?;

            assert_eq!(config.title, "My site");
            assert_eq!(config.home_url, "/");
            assert_eq!(config.lang, "en");
            assert!(!config.is_default());

            Ok(())
        });
    }
}
