//! Endpoint configuration.
//!
//! An [`EndpointConfig`] says where requests go and how they authenticate.
//! OpenAI-compatible services (OpenAI itself, UniSee) use `v1/...` paths and
//! a bearer token; Azure OpenAI routes through a deployment and an
//! `api-version` query parameter and authenticates with an `api-key` header.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ModelError, ModelResult};

/// Default OpenAI base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Path of the chat-completions endpoint on OpenAI-compatible services.
pub const CHAT_PATH: &str = "v1/chat/completions";

/// Path of the image-generation endpoint on OpenAI-compatible services.
pub const IMAGE_PATH: &str = "v1/images/generations";

/// Service provider behind an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceProvider {
    /// OpenAI or any OpenAI-compatible proxy.
    #[default]
    OpenAI,
    /// Azure OpenAI.
    Azure,
    /// UniSee (OpenAI-compatible).
    UniSee,
}

/// Which endpoint of a service a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Chat completions.
    Chat,
    /// Image generation.
    Image,
}

/// Where and how to reach a chat-completion service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Service provider.
    pub provider: ServiceProvider,
    /// Base URL; a scheme-less value gets `https://`.
    pub base_url: String,
    /// API key. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Azure `api-version` query parameter.
    pub azure_api_version: Option<String>,
    /// Azure deployment; defaults to the model name.
    pub azure_deployment: Option<String>,
}

impl EndpointConfig {
    /// OpenAI endpoint with the default base URL.
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ServiceProvider::OpenAI,
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Azure OpenAI endpoint.
    #[must_use]
    pub fn azure(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            provider: ServiceProvider::Azure,
            base_url: base_url.into(),
            api_key: api_key.into(),
            azure_api_version: Some(api_version.into()),
            azure_deployment: None,
        }
    }

    /// UniSee endpoint.
    #[must_use]
    pub fn unisee(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: ServiceProvider::UniSee,
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the Azure deployment.
    #[must_use]
    pub fn with_azure_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.azure_deployment = Some(deployment.into());
        self
    }

    /// Read the configuration for `provider` from the environment.
    ///
    /// OpenAI reads `OPENAI_API_KEY` and the optional `OPENAI_BASE_URL`;
    /// Azure reads `AZURE_URL`, `AZURE_API_KEY` and `AZURE_API_VERSION`;
    /// UniSee reads `UNISEE_URL` and `UNISEE_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a required variable is missing.
    pub fn from_env(provider: ServiceProvider) -> ModelResult<Self> {
        let config = match provider {
            ServiceProvider::OpenAI => Self::openai(required_env("OPENAI_API_KEY")?)
                .with_base_url(
                    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| OPENAI_BASE_URL.into()),
                ),
            ServiceProvider::Azure => Self::azure(
                required_env("AZURE_URL")?,
                required_env("AZURE_API_KEY")?,
                required_env("AZURE_API_VERSION")?,
            ),
            ServiceProvider::UniSee => {
                Self::unisee(required_env("UNISEE_URL")?, required_env("UNISEE_API_KEY")?)
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration without building a request.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unusable base URL or an Azure
    /// endpoint without an API version.
    pub fn validate(&self) -> ModelResult<()> {
        self.base()?;
        if self.provider == ServiceProvider::Azure && self.api_version().is_none() {
            return Err(ModelError::configuration(
                "Azure endpoints require an api-version",
            ));
        }
        Ok(())
    }

    /// Normalized base URL, always ending with `/`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is empty or does not parse.
    pub fn base(&self) -> ModelResult<Url> {
        let mut base = self.base_url.trim().trim_end_matches('/').to_string();
        if base.is_empty() {
            return Err(ModelError::configuration("base URL is not set"));
        }
        if !base.contains("://") {
            base = format!("https://{base}");
        }
        base.push('/');
        Ok(Url::parse(&base)?)
    }

    /// Full URL of an endpoint for `model`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is unusable or an Azure
    /// endpoint lacks an API version.
    pub fn endpoint_url(&self, kind: EndpointKind, model: &str) -> ModelResult<Url> {
        let base = self.base()?;
        let url = match self.provider {
            ServiceProvider::OpenAI | ServiceProvider::UniSee => {
                let path = match kind {
                    EndpointKind::Chat => CHAT_PATH,
                    EndpointKind::Image => IMAGE_PATH,
                };
                base.join(path)?
            }
            ServiceProvider::Azure => {
                let version = self.api_version().ok_or_else(|| {
                    ModelError::configuration("Azure endpoints require an api-version")
                })?;
                let deployment = self
                    .azure_deployment
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or(model);
                let action = match kind {
                    EndpointKind::Chat => "chat/completions",
                    EndpointKind::Image => "images/generations",
                };
                let mut url = base.join(&format!("deployments/{deployment}/{action}"))?;
                url.query_pairs_mut().append_pair("api-version", version);
                url
            }
        };
        debug!(provider = ?self.provider, url = %url, "Resolved endpoint");
        Ok(url)
    }

    /// Request headers: JSON content type and the provider's auth header.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key is not a valid header value.
    pub fn headers(&self) -> ModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.api_key.trim().is_empty() {
            let key = self.api_key.trim();
            let (name, value) = match self.provider {
                ServiceProvider::Azure => (HeaderName::from_static("api-key"), key.to_string()),
                ServiceProvider::OpenAI | ServiceProvider::UniSee => {
                    (AUTHORIZATION, format!("Bearer {key}"))
                }
            };
            let mut value = HeaderValue::from_str(&value)
                .map_err(|_| ModelError::configuration("API key contains invalid characters"))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        Ok(headers)
    }

    fn api_version(&self) -> Option<&str> {
        self.azure_api_version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }
}

fn required_env(name: &str) -> ModelResult<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ModelError::configuration(format!("{name} environment variable not set")))
}
