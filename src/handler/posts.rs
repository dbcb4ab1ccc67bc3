use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Context;
use crate::api::BlogClient;
use crate::document::html::parse_html;
use crate::document::image::{resolve_images, HttpImageFetcher, ImageFetcher};
use crate::document::render::{to_bytes, DocxRenderer};
use crate::outcome::{Outcome, SkipReason};
use crate::Config;

pub async fn export_posts(config: &Config, csv: PathBuf) -> anyhow::Result<()> {
    if !csv.exists() {
        anyhow::bail!("[ERROR] File not found: {}", csv.display());
    }
    let ids = read_post_ids(&csv)?;

    let documents_dir = PathBuf::from(&config.documents_dir);
    fs::create_dir_all(&documents_dir)
        .with_context(|| format!("Cannot create {}", documents_dir.display()))?;

    let client = BlogClient::from_config(config);
    let fetcher = HttpImageFetcher::new(client.http().clone());
    let renderer = DocxRenderer::new(config.image_width_inches);

    let mut saved = 0;
    let mut skipped = 0;
    for id in ids {
        println!("Processing post ID: {}", id);
        match convert_post(&client, &fetcher, &renderer, &id, &documents_dir).await {
            Ok(filename) => {
                println!("Document saved as '{}'", filename);
                saved += 1;
            }
            Err(reason) => {
                log::warn!("Post {} skipped: {}", id, reason);
                println!("{}", reason);
                skipped += 1;
            }
        }
    }

    println!("All posts processed.");
    println!("{} saved, {} skipped.", saved, skipped);
    Ok(())
}

/// Non-empty values of the `ID` column, in file order.
fn read_post_ids(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;

    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == "ID")
        .ok_or_else(|| anyhow::anyhow!("{} has no ID column", path.display()))?;

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        match record.get(column).map(str::trim) {
            Some(id) if !id.is_empty() => ids.push(id.to_string()),
            _ => log::debug!("Row {:?} has no ID", record.position()),
        }
    }
    Ok(ids)
}

async fn convert_post(
    client: &BlogClient,
    fetcher: &dyn ImageFetcher,
    renderer: &DocxRenderer,
    id: &str,
    documents_dir: &Path,
) -> Outcome<String> {
    check_post_id(id)?;
    let post = client.fetch_post(id).await?;
    log::info!("Rendering '{}'", post.title.as_deref().unwrap_or(id));
    let content = post.content.unwrap_or_default();

    let blocks = parse_html(&content);
    let images = resolve_images(&blocks, fetcher).await;
    let bytes = to_bytes(renderer.render(&blocks, &images))
        .map_err(|e| SkipReason::Render(e.to_string()))?;

    let filename = format!("{}.docx", id);
    let path = documents_dir.join(&filename);
    fs::write(&path, bytes).map_err(|e| SkipReason::Write(format!("{}: {}", path.display(), e)))?;
    Ok(filename)
}

/// IDs name both the request path and the output file, so they must stay a
/// single path component.
fn check_post_id(id: &str) -> Outcome<()> {
    if id.contains(['/', '\\']) || id.contains("..") {
        return Err(SkipReason::InvalidId(id.to_string()));
    }
    Ok(())
}
