// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use figment::Figment;
use serde::de::DeserializeOwned;

/// Error returned when a configuration section can't be loaded
pub type SectionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Trait implemented by every configuration section, to load it on its own
/// from the merged configuration.
pub trait ConfigurationSection: Sized + DeserializeOwned {
    /// Where this section lives relative to the root. `None` for the root.
    const PATH: Option<&'static str> = None;

    /// Check the section for errors serde can't catch, like duplicate entries
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    fn validate(&self, _figment: &Figment) -> Result<(), SectionError> {
        Ok(())
    }

    /// Extract and validate the section.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is missing, could not be
    /// deserialized, or is invalid
    fn extract(figment: &Figment) -> Result<Self, SectionError> {
        let this: Self = match Self::PATH {
            Some(path) => figment.extract_inner(path)?,
            None => figment.extract()?,
        };

        this.validate(figment)?;
        Ok(this)
    }
}

/// Extension trait for sections with a default value, which can be left out
/// of the configuration entirely
pub trait ConfigurationSectionExt: ConfigurationSection + Default {
    /// Extract and validate the section, falling back to the default value if
    /// it is not present.
    ///
    /// # Errors
    ///
    /// Returns an error if the section could not be deserialized, or is
    /// invalid
    fn extract_or_default(figment: &Figment) -> Result<Self, SectionError> {
        let this: Self = match Self::PATH {
            Some(path) if !figment.contains(path) => return Ok(Self::default()),
            Some(path) => figment.extract_inner(path)?,
            None => figment.extract()?,
        };

        this.validate(figment)?;
        Ok(this)
    }
}

impl<T: ConfigurationSection + Default> ConfigurationSectionExt for T {}
