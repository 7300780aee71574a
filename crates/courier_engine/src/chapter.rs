use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, warn};
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;

use crate::{images, FailureKind, FetchError, FetchVariant, PageClient, Workdir};

const SITE_ROOT: &str = "https://komiku.org";

/// Retrieves one chapter's page images into a per-chapter folder.
///
/// Returns the ordered saved paths. An empty list means the chapter had no
/// usable images; cancellation surfaces as `FailureKind::Cancelled` with any
/// partial folder already discarded.
#[async_trait]
pub trait ChapterFetcher: Send + Sync {
    async fn fetch_chapter(
        &self,
        chapter_url: &str,
        chapter: u32,
        workdir: &Workdir,
        variant: FetchVariant,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, FetchError>;
}

/// Scrapes the komiku chapter-page layout.
#[derive(Debug, Clone)]
pub struct SiteChapterFetcher {
    client: PageClient,
}

impl SiteChapterFetcher {
    pub fn new(client: PageClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChapterFetcher for SiteChapterFetcher {
    async fn fetch_chapter(
        &self,
        chapter_url: &str,
        chapter: u32,
        workdir: &Workdir,
        variant: FetchVariant,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, FetchError> {
        let html = self.client.get_text(chapter_url).await?;
        let urls = extract_image_urls(&html, variant);
        if urls.is_empty() {
            warn!("no content images found at {chapter_url}");
            return Ok(Vec::new());
        }

        let dir = workdir.chapter_dir(chapter, variant);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;

        let mut saved = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            // Checkpoint: stop before starting the next image, discard partials.
            if cancel.is_cancelled() {
                debug!("chapter {chapter} cancelled after {} images", saved.len());
                let _ = workdir.remove_chapter_dir(chapter, variant);
                return Err(FetchError::new(FailureKind::Cancelled, "download cancelled"));
            }

            let bytes = match self.client.get_bytes(url).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("image {url} failed: {err}");
                    continue;
                }
            };
            let jpeg = match variant {
                FetchVariant::Standard => images::normalize_to_jpeg(&bytes),
                FetchVariant::HighFidelity => images::upscale_to_jpeg(&bytes),
            };
            let jpeg = match jpeg {
                Ok(jpeg) => jpeg,
                Err(err) => {
                    warn!("image {url} unusable: {err}");
                    continue;
                }
            };

            let path = dir.join(format!("{:03}.jpg", index + 1));
            if let Err(err) = tokio::fs::write(&path, &jpeg).await {
                warn!("saving {} failed: {err}", path.display());
                continue;
            }
            debug!("saved page {}/{} of chapter {chapter}", index + 1, urls.len());
            saved.push(path);
        }

        Ok(saved)
    }
}

/// Pulls content image URLs out of chapter-page markup, dropping ads and site
/// assets, and (for the high-fidelity variant) rewriting toward larger assets.
pub fn extract_image_urls(html: &str, variant: FetchVariant) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(img_sel) = Selector::parse("img") else {
        return Vec::new();
    };

    doc.select(&img_sel)
        .filter_map(|img| {
            img.value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
        })
        .filter(|src| src.ends_with(".jpg") || src.ends_with(".png"))
        .filter(|src| !src.contains("komikuplus") && !src.contains("asset/img"))
        .map(absolutize)
        .map(|src| match variant {
            FetchVariant::Standard => src,
            FetchVariant::HighFidelity => upscale_source_url(&src),
        })
        .collect()
}

fn absolutize(src: &str) -> String {
    if src.starts_with("http") {
        src.to_string()
    } else if let Some(rest) = src.strip_prefix("//") {
        format!("https://{rest}")
    } else if src.starts_with('/') {
        format!("{SITE_ROOT}{src}")
    } else {
        format!("https://{src}")
    }
}

/// Rewrites known thumbnail/resize markers toward the full-size asset.
fn upscale_source_url(src: &str) -> String {
    if let Some(base) = src.split("?resize=").next() {
        if base != src {
            return base.to_string();
        }
    }
    if src.contains("thumb") {
        return src.replace("thumb", "full");
    }
    if src.contains("_small") {
        return src.replace("_small", "_large");
    }
    if src.contains("_medium") {
        return src.replace("_medium", "_large");
    }
    src.to_string()
}
