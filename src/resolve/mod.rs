pub mod ytdlp;

pub use ytdlp::YtDlpResolver;

use crate::clip::ResolvedSource;
use crate::error::Result;
use async_trait::async_trait;

/// Turns a video page URL into a directly fetchable stream plus its length.
///
/// Every failure (private video, region block, network, malformed URL) is
/// reported as `ClipError::Resolve`.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<ResolvedSource>;
    fn name(&self) -> &'static str;
}
