use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerateRequest, GenerateStream, Headers};

/// A remote model service that answers a request with a stream of events.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, e.g. `"anthropic"`.
    fn provider_id(&self) -> &str;

    /// Authentication and protocol headers, merged with `custom_headers`.
    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers;

    /// Send `request` and return the response as it streams in.
    ///
    /// Failures to open the stream are returned here; failures after that arrive
    /// as `Err` items on the stream.
    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream>;
}
