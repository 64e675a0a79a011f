//! Profile transport
//!
//! The boundary that performs the fetch and update exchanges with the
//! profile service. Implementations are stateless: no retries, no caching.

mod http;

pub use http::HttpTransport;

use crate::error::TransportResult;
use crate::profile::{Profile, ProfileUpdate};
use async_trait::async_trait;

/// Multipart field carrying the picture
pub const IMAGE_FIELD: &str = "profile_picture";

/// Filename sent with every picture upload
pub const IMAGE_FILENAME: &str = "filename.jpg";

/// Content type sent with every picture upload
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Request/response mapping for the two profile operations
#[async_trait]
pub trait ProfileTransport: Send + Sync {
    /// Fetch the deployment's profile
    async fn fetch_profile(&self) -> TransportResult<Profile>;

    /// Replace the profile's editable fields, uploading a picture if present
    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> TransportResult<Profile>;
}
