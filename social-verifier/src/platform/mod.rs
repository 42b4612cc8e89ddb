//! Selectable social platforms and the registry that maps them to provider identifiers.
//!
//! A provider identifier is an opaque key naming the verification template the
//! proof collaborator should run. Every platform in the selectable set carries
//! one by default; deployments may override individual entries.

use std::{collections::HashMap, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::coordinator::error::VerificationError;

/// Social platform a user can verify ownership of
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    Github,
    Linkedin,
    Upwork,
    #[default]
    Instagram,
    #[serde(alias = "twitter")]
    #[strum(to_string = "x", serialize = "twitter")]
    X,
    Youtube,
    Spotify,
}

impl Platform {
    /// Human-readable name shown next to the platform selector
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Linkedin => "LinkedIn",
            Self::Upwork => "Upwork",
            Self::Instagram => "Instagram",
            Self::X => "Twitter (X)",
            Self::Youtube => "YouTube",
            Self::Spotify => "Spotify",
        }
    }

    /// Provider identifier registered for this platform out of the box
    #[must_use]
    pub const fn default_provider_id(self) -> &'static str {
        match self {
            Self::Instagram => "a7dcfc29-25a6-44ca-8e7b-a3099044bc63",
            Self::X => "2523321f-f61d-4db3-b4e6-e665af5efdc1",
            Self::Youtube => "5a939797-afe0-4ad9-8dc4-6db967841a2c",
            Self::Github => "6d3f6753-7ee6-49ee-a545-62f1b1822ae5",
            Self::Linkedin => "a9f1063c-06b7-476a-8410-9ff6e427e637",
            Self::Upwork => "f0912203-36b3-4cf4-b78d-30853245f6b9",
            Self::Spotify => "31d6ad77-b726-4726-a5b3-330e16482ab6",
        }
    }

    /// Parses a user-supplied platform name, trimming whitespace and ignoring case
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::UnknownPlatform` if the name is not a selectable platform
    pub fn parse(name: &str) -> Result<Self, VerificationError> {
        Self::from_str(name.trim())
            .map_err(|_| VerificationError::UnknownPlatform(name.to_string()))
    }
}

/// Static mapping from platform to provider identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRegistry {
    providers: HashMap<Platform, String>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProviderRegistry {
    /// Creates a registry without any mapping
    #[must_use]
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Creates a registry holding the default provider identifier of every platform
    #[must_use]
    pub fn with_defaults() -> Self {
        let providers = Platform::iter()
            .map(|platform| (platform, platform.default_provider_id().to_string()))
            .collect();
        Self { providers }
    }

    /// Replaces the provider identifier of one platform.
    ///
    /// Blank identifiers are ignored so a mapping can never become empty.
    #[must_use]
    pub fn with_override(mut self, platform: Platform, provider_id: &str) -> Self {
        let provider_id = provider_id.trim();
        if provider_id.is_empty() {
            tracing::warn!(%platform, "Ignoring blank provider id override");
        } else {
            self.providers.insert(platform, provider_id.to_string());
        }
        self
    }

    /// Returns the provider identifier registered for `platform`, if any
    #[must_use]
    pub fn provider_id(&self, platform: Platform) -> Option<&str> {
        self.providers.get(&platform).map(String::as_str)
    }

    /// Resolves a platform name to the platform and its provider identifier
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::UnknownPlatform` if the name does not parse or has no mapping
    pub fn resolve(&self, name: &str) -> Result<(Platform, &str), VerificationError> {
        let platform = Platform::parse(name)?;
        self.provider_id(platform)
            .map(|provider_id| (platform, provider_id))
            .ok_or_else(|| VerificationError::UnknownPlatform(name.to_string()))
    }

    /// Registered platforms in selector order
    #[must_use]
    pub fn entries(&self) -> Vec<(Platform, &str)> {
        Platform::iter()
            .filter_map(|platform| self.provider_id(platform).map(|id| (platform, id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_platform_has_a_default_provider() {
        let registry = ProviderRegistry::with_defaults();

        for platform in Platform::iter() {
            let provider_id = registry.provider_id(platform).unwrap();
            assert!(!provider_id.is_empty(), "{platform} has no provider id");
        }
        assert_eq!(registry.entries().len(), 7);
    }

    #[test]
    fn test_parse_accepts_aliases_and_case() {
        assert_eq!(Platform::parse("twitter").unwrap(), Platform::X);
        assert_eq!(Platform::parse("X").unwrap(), Platform::X);
        assert_eq!(Platform::parse("  GitHub ").unwrap(), Platform::Github);
        assert_eq!(Platform::X.to_string(), "x");
    }

    #[test]
    fn test_resolve_unknown_platform() {
        let registry = ProviderRegistry::with_defaults();

        let err = registry.resolve("myspace").unwrap_err();
        assert!(matches!(err, VerificationError::UnknownPlatform(name) if name == "myspace"));
    }

    #[test]
    fn test_resolve_platform_without_mapping() {
        let registry = ProviderRegistry::empty();

        assert!(matches!(
            registry.resolve("github"),
            Err(VerificationError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn test_override_replaces_provider_and_ignores_blank() {
        let registry = ProviderRegistry::with_defaults()
            .with_override(Platform::Github, "custom-github")
            .with_override(Platform::Spotify, "   ");

        assert_eq!(registry.resolve("github").unwrap().1, "custom-github");
        assert_eq!(
            registry.provider_id(Platform::Spotify),
            Some(Platform::Spotify.default_provider_id())
        );
    }
}
