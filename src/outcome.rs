use thiserror::Error;

/// Result of processing one item of a batch: a post, an image, a file.
/// A skipped item never aborts the batch it belongs to.
pub type Outcome<T> = Result<T, SkipReason>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("Failed to fetch post: Status code {0}")]
    Status(u16),

    #[error("Failed to fetch post: {0}")]
    Request(String),

    #[error("Invalid post ID: {0}")]
    InvalidId(String),

    #[error("No content available for this post.")]
    NoContent,

    #[error("unsupported image source: {0}")]
    UnsupportedSource(String),

    #[error("malformed data URL")]
    MalformedDataUrl,

    #[error("image download failed: status code {0}")]
    ImageStatus(u16),

    #[error("image download failed: {0}")]
    ImageRequest(String),

    #[error("undecodable image: {0}")]
    UndecodableImage(String),

    #[error("Conversion failed: {0}")]
    Render(String),

    #[error("Failed to write {0}")]
    Write(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        assert_eq!(
            SkipReason::Status(404).to_string(),
            "Failed to fetch post: Status code 404"
        );
        assert_eq!(
            SkipReason::NoContent.to_string(),
            "No content available for this post."
        );
    }
}
