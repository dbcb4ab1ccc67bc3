use std::collections::HashMap;
use std::io::Cursor;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use reqwest::Client;

use super::model::{image_sources, Block};
use crate::outcome::{Outcome, SkipReason};

/// An image ready to embed: PNG bytes plus pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Outcome<Vec<u8>>;
}

pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Outcome<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SkipReason::ImageRequest(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SkipReason::ImageStatus(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SkipReason::ImageRequest(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

pub async fn resolve_image(src: &str, fetcher: &dyn ImageFetcher) -> Outcome<ResolvedImage> {
    let bytes = if src.starts_with("data:") {
        decode_data_url(src)?
    } else if src.starts_with("http://") || src.starts_with("https://") {
        fetcher.fetch(src).await?
    } else if let Some(rest) = src.strip_prefix("//") {
        fetcher.fetch(&format!("https://{}", rest)).await?
    } else {
        return Err(SkipReason::UnsupportedSource(short(src)));
    };
    decode_image(&bytes)
}

/// Resolves every image of the document once. Sources that cannot be
/// resolved are left out of the map and logged.
pub async fn resolve_images(
    blocks: &[Block],
    fetcher: &dyn ImageFetcher,
) -> HashMap<String, ResolvedImage> {
    let mut images = HashMap::new();
    for src in image_sources(blocks) {
        if images.contains_key(src) {
            continue;
        }
        match resolve_image(src, fetcher).await {
            Ok(image) => {
                images.insert(src.to_string(), image);
            }
            Err(reason) => log::warn!("Skipping image {}: {}", short(src), reason),
        }
    }
    images
}

fn decode_data_url(src: &str) -> Outcome<Vec<u8>> {
    let (header, payload) = src.split_once(',').ok_or(SkipReason::MalformedDataUrl)?;
    if !header.contains(";base64") {
        return Err(SkipReason::MalformedDataUrl);
    }
    let payload = payload
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| SkipReason::MalformedDataUrl)
}

fn decode_image(bytes: &[u8]) -> Outcome<ResolvedImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| SkipReason::UndecodableImage(e.to_string()))?;

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| SkipReason::UndecodableImage(e.to_string()))?;

    Ok(ResolvedImage {
        width_px: image.width(),
        height_px: image.height(),
        png,
    })
}

/// Data URLs can be megabytes long; logs get the head only.
fn short(src: &str) -> String {
    match src.char_indices().nth(64) {
        Some((end, _)) => format!("{}...", &src[..end]),
        None => src.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{png_bytes, png_data_url};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Offline;

    #[async_trait]
    impl ImageFetcher for Offline {
        async fn fetch(&self, _url: &str) -> Outcome<Vec<u8>> {
            Err(SkipReason::ImageRequest("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_data_url() -> anyhow::Result<()> {
        let image = resolve_image(&png_data_url(4, 2), &Offline).await?;
        assert_eq!((image.width_px, image.height_px), (4, 2));
        assert!(image.png.starts_with(&[0x89, b'P', b'N', b'G']));
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_sources_are_skipped() {
        assert_eq!(
            resolve_image("data:image/png,not-base64", &Offline).await,
            Err(SkipReason::MalformedDataUrl)
        );
        assert!(matches!(
            resolve_image("data:image/png;base64,aGVsbG8=", &Offline).await,
            Err(SkipReason::UndecodableImage(_))
        ));
        assert!(matches!(
            resolve_image("images/local.png", &Offline).await,
            Err(SkipReason::UnsupportedSource(_))
        ));
        assert!(matches!(
            resolve_image("https://example.invalid/a.png", &Offline).await,
            Err(SkipReason::ImageRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_image() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/chart.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(3, 3)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/media/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpImageFetcher::new(Client::new());
        let image = resolve_image(&format!("{}/media/chart.png", server.uri()), &fetcher).await?;
        assert_eq!(image.width_px, 3);

        let missing = resolve_image(&format!("{}/media/missing.png", server.uri()), &fetcher).await;
        assert_eq!(missing, Err(SkipReason::ImageStatus(404)));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_images_keeps_only_resolved() {
        let good = png_data_url(1, 1);
        let blocks = vec![
            Block::Image { src: good.clone() },
            Block::Image { src: "ftp://host/x.png".to_string() },
            Block::Image { src: good.clone() },
        ];
        let images = resolve_images(&blocks, &Offline).await;
        assert_eq!(images.len(), 1);
        assert!(images.contains_key(&good));
    }

    #[test]
    fn test_short() {
        let long = format!("data:image/png;base64,{}", "A".repeat(200));
        assert_eq!(short(&long).chars().count(), 67);
        assert_eq!(short("a.png"), "a.png");
    }
}
