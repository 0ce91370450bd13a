// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::Error as _};
use serde_with::serde_as;
use url::Url;

use crate::{ConfigurationSection, SectionError};

fn default_base_url() -> Url {
    Url::parse("http://localhost:8080/assets/").unwrap()
}

fn is_default_base_url(value: &Url) -> bool {
    *value == default_base_url()
}

/// Configuration related to the assets of the mounted applications
#[serde_as]
#[derive(Clone, Debug, Deserialize, JsonSchema, Serialize, PartialEq, Eq)]
pub struct AssetsConfig {
    /// The public URL under which local application directories are served,
    /// using their directory name. Defaults to
    /// `http://localhost:8080/assets/`.
    #[serde(
        default = "default_base_url",
        skip_serializing_if = "is_default_base_url"
    )]
    pub base_url: Url,

    /// Script dependencies added to the scripts of every local application
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_script_dependencies: Vec<String>,

    /// Appended to the path of the `asset-manifest` endpoint of remote
    /// applications, for example `.json`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub manifest_endpoint_suffix: String,

    /// Timeout of the requests made to remote applications, in seconds. No
    /// timeout by default.
    #[schemars(with = "Option<u64>", range(min = 1, max = 300))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<serde_with::DurationSeconds<u64>>")]
    pub remote_timeout: Option<Duration>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_script_dependencies: Vec::new(),
            manifest_endpoint_suffix: String::new(),
            remote_timeout: None,
        }
    }
}

impl AssetsConfig {
    /// Returns true if the configuration is the default one
    pub(crate) fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ConfigurationSection for AssetsConfig {
    const PATH: Option<&'static str> = Some("assets");

    fn validate(&self, figment: &figment::Figment) -> Result<(), SectionError> {
        let annotate = |mut error: figment::Error, field: &str| {
            error.metadata = figment
                .find_metadata(&format!("{root}.{field}", root = Self::PATH.unwrap()))
                .cloned();
            error.profile = Some(figment::Profile::Default);
            error.path = vec![Self::PATH.unwrap().to_owned(), field.to_owned()];
            error
        };

        if self.base_url.cannot_be_a_base() {
            return Err(annotate(
                figment::Error::custom("The asset base URL must be able to hold a path"),
                "base_url",
            )
            .into());
        }

        if self.manifest_endpoint_suffix.contains(['/', '?', '#']) {
            return Err(annotate(
                figment::Error::custom(
                    "The manifest endpoint suffix must not contain `/`, `?` or `#`",
                ),
                "manifest_endpoint_suffix",
            )
            .into());
        }

        Ok(())
    }
}
