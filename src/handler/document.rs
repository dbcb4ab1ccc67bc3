use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Context;
use walkdir::DirEntry;
use crate::document::process_document;

pub fn convert_documents(path: PathBuf, output: PathBuf, recursive: bool) -> anyhow::Result<()> {
    if path.is_dir() {
        process_directory(&path, recursive)
    } else {
        process_single_file(&path, &output)?;
        println!("HTML has been saved to {} in UTF-8 encoding.", output.display());
        Ok(())
    }
}

/// Each `.docx` becomes a sibling `.html`. A file that fails is reported
/// and the walk goes on.
fn process_directory(path: &Path, recursive: bool) -> anyhow::Result<()> {
    let mut converted = 0;
    let mut failed = 0;

    for entry in get_entries(path, recursive) {
        let entry_path = entry.path();
        if !entry_path.is_file() {
            continue;
        }
        match entry_path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("docx") => {
                let output = entry_path.with_extension("html");
                match process_single_file(entry_path, &output) {
                    Ok(()) => {
                        println!("{} -> {}", entry_path.display(), output.display());
                        converted += 1;
                    }
                    Err(err) => {
                        log::warn!("Skipping {}: {:#}", entry_path.display(), err);
                        failed += 1;
                    }
                }
            }
            _ => log::debug!("Skipping non-Word file {}", entry_path.display()),
        }
    }

    println!("Converted {} document(s), {} failed.", converted, failed);
    Ok(())
}

fn process_single_file(path: &Path, output: &Path) -> anyhow::Result<()> {
    log::info!("Converting {}", path.display());
    let html = process_document(path)
        .with_context(|| format!("Failed to convert {}", path.display()))?;
    fs::write(output, html).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

fn get_entries(path: &Path, recursive: bool) -> Box<dyn Iterator<Item = DirEntry>> {
    let iter = if recursive {
        walkdir::WalkDir::new(path)
    } else {
        walkdir::WalkDir::new(path).max_depth(1)
    };
    Box::new(iter.into_iter().filter_map(|e| e.ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};

    fn write_docx(path: &Path, text: &str) -> anyhow::Result<()> {
        let docx = Docx::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)));
        fs::write(path, crate::document::render::to_bytes(docx)?)?;
        Ok(())
    }

    #[test]
    fn test_single_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("post.docx");
        let output = dir.path().join("output.txt");
        write_docx(&source, "Hello")?;

        convert_documents(source, output.clone(), false)?;
        assert_eq!(fs::read_to_string(output)?, "<p>Hello</p>");
        Ok(())
    }

    #[test]
    fn test_directory_skips_bad_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("nested");
        fs::create_dir(&nested)?;
        write_docx(&dir.path().join("a.docx"), "A")?;
        write_docx(&nested.join("b.docx"), "B")?;
        fs::write(dir.path().join("broken.docx"), b"not a zip")?;

        convert_documents(dir.path().to_path_buf(), PathBuf::from("unused"), false)?;
        assert!(dir.path().join("a.html").exists());
        assert!(!dir.path().join("broken.html").exists());
        assert!(!nested.join("b.html").exists());

        convert_documents(dir.path().to_path_buf(), PathBuf::from("unused"), true)?;
        assert_eq!(fs::read_to_string(nested.join("b.html"))?, "<p>B</p>");
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = convert_documents(
            PathBuf::from("/nonexistent/post.docx"),
            PathBuf::from("out.txt"),
            false,
        );
        assert!(result.is_err());
    }
}
