//! Share links for a verification request url.

use schemars::JsonSchema;
use serde::Serialize;
use url::Url;

const WHATSAPP_SHARE_URL: &str = "https://wa.me/";
const TELEGRAM_SHARE_URL: &str = "https://t.me/share/url";

const WHATSAPP_MESSAGE: &str = "Verify your social media account using this link: ";
const TELEGRAM_MESSAGE: &str = "Verify your social media account using this link!";

/// Links that open a messenger with the request url prefilled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinks {
    pub whatsapp: String,
    pub telegram: String,
}

impl ShareLinks {
    /// Builds the share links for `request_url`
    ///
    /// # Errors
    ///
    /// Returns an error if one of the messenger base urls fails to parse
    pub fn for_request_url(request_url: &str) -> Result<Self, url::ParseError> {
        let whatsapp = Url::parse_with_params(
            WHATSAPP_SHARE_URL,
            &[("text", format!("{WHATSAPP_MESSAGE}{request_url}"))],
        )?;
        let telegram = Url::parse_with_params(
            TELEGRAM_SHARE_URL,
            &[("url", request_url), ("text", TELEGRAM_MESSAGE)],
        )?;

        Ok(Self {
            whatsapp: whatsapp.into(),
            telegram: telegram.into(),
        })
    }
}
