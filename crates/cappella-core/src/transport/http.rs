//! HTTP transport backed by reqwest

use super::{ProfileTransport, IMAGE_CONTENT_TYPE, IMAGE_FIELD, IMAGE_FILENAME};
use crate::config::ClientConfig;
use crate::error::{TransportError, TransportResult};
use crate::profile::{Profile, ProfileUpdate};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use tracing::{debug, trace};

/// Talks to `{base_url}/api/user/{resource_path}/`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    resource_path: String,
}

impl HttpTransport {
    /// Build a transport with its own client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built
    pub fn new(config: &ClientConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Self::with_client(client, config)
    }

    /// Build a transport around an existing client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid
    pub fn with_client(client: Client, config: &ClientConfig) -> TransportResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::Client(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::Client(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }
        Ok(Self {
            client,
            base_url,
            resource_path: config.resource_path.trim_matches('/').to_string(),
        })
    }

    /// URL of the profile resource, or of one profile under it when `id` is given
    #[must_use]
    pub fn endpoint(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "user"]);
            segments.extend(self.resource_path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
            // trailing slash
            segments.push("");
        }
        url
    }
}

fn text_part(value: &str) -> TransportResult<Part> {
    Part::text(value.to_string())
        .mime_str("text/plain")
        .map_err(|e| TransportError::Client(e.to_string()))
}

/// Build the multipart body for an update
///
/// # Errors
/// Returns an error if a part cannot be built
pub fn update_form(update: &ProfileUpdate) -> TransportResult<Form> {
    let mut form = Form::new()
        .part("name", text_part(&update.name)?)
        .part("dob", text_part(&update.date_of_birth)?)
        .part("gender", text_part(update.gender.as_str())?);

    if let Some(bytes) = &update.image {
        let picture = Part::bytes(bytes.clone())
            .file_name(IMAGE_FILENAME)
            .mime_str(IMAGE_CONTENT_TYPE)
            .map_err(|e| TransportError::Client(e.to_string()))?;
        form = form.part(IMAGE_FIELD, picture);
    }

    Ok(form)
}

fn trim_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Map a response to a profile, checking status and body
async fn read_profile(response: Response) -> TransportResult<Profile> {
    let status = response.status();
    debug!(%status, url = %response.url(), "Profile response");

    if !status.is_success() {
        return Err(TransportError::Http {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    trace!(body = %String::from_utf8_lossy(&body), "Profile response body");

    let trimmed = trim_whitespace(&body);
    if trimmed.is_empty() || trimmed == b"null" {
        return Err(TransportError::EmptyBody);
    }

    Ok(serde_json::from_slice(trimmed)?)
}

#[async_trait]
impl ProfileTransport for HttpTransport {
    async fn fetch_profile(&self) -> TransportResult<Profile> {
        let url = self.endpoint(None);
        debug!(%url, "GET profile");

        let response = self.client.get(url).send().await?;
        read_profile(response).await
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> TransportResult<Profile> {
        let url = self.endpoint(Some(id));
        debug!(
            %url,
            with_image = update.image.is_some(),
            "PUT profile"
        );

        let form = update_form(update)?;
        let response = self.client.put(url).multipart(form).send().await?;
        read_profile(response).await
    }
}
