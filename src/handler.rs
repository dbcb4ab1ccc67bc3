use std::io::{self, Write};
use std::path::PathBuf;
use clap::Parser;
use crate::Config;

mod document;
mod posts;
mod write;

#[derive(Parser, Debug)]
#[command(name = "blogdocs")]
#[command(about = "Convert blog posts between Word documents, HTML and the CMS API", version = "1.0")]
pub enum Cli {
    /// Convert a Word document (or a directory of them) to HTML
    ToHtml {
        #[arg(help = "Word file or directory; prompted for when omitted")]
        path: Option<PathBuf>,

        #[arg(short, long, help = "Output file for a single document")]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Walk subdirectories")]
        recursive: bool,
    },

    /// Fetch the posts listed in a CSV and save each one as a Word document
    Posts {
        #[arg(help = "CSV file with an ID column; prompted for when omitted")]
        csv: Option<PathBuf>,
    },

    /// Export post metadata to CSV
    Metadata {
        #[arg(short, long, help = "Output CSV path")]
        output: Option<PathBuf>,
    },
}

pub async fn handler(args: Cli, config: Config) -> anyhow::Result<()> {
    match args {
        Cli::ToHtml { path, output, recursive } => {
            let path = path_or_prompt(path, "Enter Word File Name: ")?;
            let output = output.unwrap_or_else(|| PathBuf::from(&config.html_output));
            document::convert_documents(path, output, recursive)
        }
        Cli::Posts { csv } => {
            let csv = path_or_prompt(csv, "Enter the path to your CSV file: ")?;
            posts::export_posts(&config, csv).await
        }
        Cli::Metadata { output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.metadata_output));
            write::export_to_csv(&config, output).await
        }
    }
}

fn path_or_prompt(path: Option<PathBuf>, label: &str) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => {
            let mut input = String::new();
            print!("{}", label);
            io::stdout().flush()?;
            io::stdin().read_line(&mut input)?;
            let input = input.trim();
            if input.is_empty() {
                anyhow::bail!("No path given");
            }
            Ok(PathBuf::from(input))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["blogdocs", "to-html", "post.docx", "-o", "post.html"])?;
        assert!(matches!(
            cli,
            Cli::ToHtml { path: Some(ref p), output: Some(ref o), recursive: false }
                if p == &PathBuf::from("post.docx") && o == &PathBuf::from("post.html")
        ));

        let cli = Cli::try_parse_from(["blogdocs", "posts"])?;
        assert!(matches!(cli, Cli::Posts { csv: None }));

        let cli = Cli::try_parse_from(["blogdocs", "metadata", "--output", "meta.csv"])?;
        assert!(matches!(cli, Cli::Metadata { output: Some(_) }));
        Ok(())
    }
}
