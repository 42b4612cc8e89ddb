use std::env;

use strum::IntoEnumIterator;
use url::Url;

use crate::{
    platform::{Platform, ProviderRegistry},
    provider::AppCredentials,
};

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (local proof gateway)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the application credentials registered with the proof collaborator
    ///
    /// # Panics
    ///
    /// Panics if `RECLAIM_APP_ID` or `RECLAIM_APP_SECRET` is not set in production/staging
    #[must_use]
    pub fn app_credentials(&self) -> AppCredentials {
        match self {
            Self::Production | Self::Staging => AppCredentials::new(
                env::var("RECLAIM_APP_ID")
                    .expect("RECLAIM_APP_ID environment variable is not set"),
                env::var("RECLAIM_APP_SECRET")
                    .expect("RECLAIM_APP_SECRET environment variable is not set"),
            ),
            Self::Development => AppCredentials::new(
                env::var("RECLAIM_APP_ID").unwrap_or_else(|_| "development-app".to_string()),
                env::var("RECLAIM_APP_SECRET")
                    .unwrap_or_else(|_| "development-secret".to_string()),
            ),
        }
    }

    /// Returns the base url of the proof gateway
    ///
    /// # Panics
    ///
    /// Panics if `PROOF_GATEWAY_URL` is not set in production/staging or is not a valid url
    #[must_use]
    pub fn proof_gateway_url(&self) -> String {
        let gateway_url = match self {
            Self::Production | Self::Staging => env::var("PROOF_GATEWAY_URL")
                .expect("PROOF_GATEWAY_URL environment variable is not set"),
            Self::Development => env::var("PROOF_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        };

        Url::parse(&gateway_url).expect("PROOF_GATEWAY_URL is not a valid url");
        gateway_url
    }

    /// Returns the public url the proof gateway posts session outcomes to
    ///
    /// # Panics
    ///
    /// Panics if `PUBLIC_CALLBACK_URL` is not set in production/staging or is not a valid url
    #[must_use]
    pub fn callback_url(&self) -> String {
        let callback_url = match self {
            Self::Production | Self::Staging => env::var("PUBLIC_CALLBACK_URL")
                .expect("PUBLIC_CALLBACK_URL environment variable is not set"),
            Self::Development => env::var("PUBLIC_CALLBACK_URL").unwrap_or_else(|_| {
                format!("http://localhost:{}/v1/verification/callback", self.port())
            }),
        };

        Url::parse(&callback_url).expect("PUBLIC_CALLBACK_URL is not a valid url");
        callback_url
    }

    /// Returns the provider registry, applying `PROVIDER_ID_<PLATFORM>` overrides
    #[must_use]
    pub fn provider_registry(&self) -> ProviderRegistry {
        Platform::iter().fold(ProviderRegistry::with_defaults(), |registry, platform| {
            let key = format!("PROVIDER_ID_{}", platform.to_string().to_uppercase());
            match env::var(&key) {
                Ok(provider_id) => {
                    tracing::info!(%platform, "Using provider id override from {key}");
                    registry.with_override(platform, &provider_id)
                }
                Err(_) => registry,
            }
        })
    }

    /// Port the HTTP server listens on
    ///
    /// # Panics
    ///
    /// Panics if `PORT` is set but is not a valid u16
    #[must_use]
    pub fn port(&self) -> u16 {
        env::var("PORT").map_or(8000, |port| {
            port.parse()
                .expect("PORT environment variable is not a valid u16")
        })
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}
