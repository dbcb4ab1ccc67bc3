use clap::Parser;
use dotenv::dotenv;
use handler::Cli;
use serde::{Deserialize, Serialize};

mod api;
mod document;
mod handler;
mod outcome;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = read_config()?;
    let args = Cli::parse();
    handler::handler(args, config).await?;
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    // API
    api_url: String,
    api_token: String,

    // Output
    documents_dir: String,
    html_output: String,
    metadata_output: String,

    // Rendering
    image_width_inches: f64,
}

fn read_config() -> anyhow::Result<Config> {
    Ok(config::Config::builder()
        .set_default("api_url", "")?
        .set_default("api_token", "")?
        .set_default("documents_dir", "documents")?
        .set_default("html_output", "output.txt")?
        .set_default("metadata_output", "output.csv")?
        .set_default("image_width_inches", 5.0)?
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::with_prefix("BLOGDOCS"))
        .build()?
        .try_deserialize::<Config>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_config() -> anyhow::Result<()> {
        let config = read_config()?;
        println!("{:?}", config);
        assert!(config.image_width_inches > 0.0);
        assert!(!config.documents_dir.is_empty());
        Ok(())
    }
}
