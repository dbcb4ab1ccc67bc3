use std::io;
use std::path::PathBuf;
use anyhow::Context;
use crate::api::{field_text, BlogClient, PostMeta};
use crate::Config;

const HEADER: [&str; 5] = ["ID", "Title", "Meta Title", "Meta Description", "DOCX Filename"];

pub async fn export_to_csv(config: &Config, path: PathBuf) -> anyhow::Result<()> {
    let client = BlogClient::from_config(config);
    let records = match client.fetch_all().await {
        Ok(records) => records,
        Err(err) => {
            log::error!("An error occurred: {:#}", err);
            return Ok(());
        }
    };

    let file = std::fs::File::create(&path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let rows = write_metadata(&records, file)?;
    println!("Saved {} record(s) to {}", rows, path.display());
    Ok(())
}

/// One row per record, fields echoed as received.
pub fn write_metadata<W: io::Write>(records: &[PostMeta], writer: W) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;

    for record in records {
        writer.write_record([
            record.id_text(),
            field_text(&record.title),
            field_text(&record.meta_title),
            field_text(&record.meta_description),
            record.docx_filename(),
        ])?;
    }

    writer.flush()?;
    Ok(records.len())
}
