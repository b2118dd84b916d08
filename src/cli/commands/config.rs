//! Config command - show the effective configuration

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show the XDG directories in use
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Directories resolved at startup
#[derive(Debug, Serialize)]
pub struct Paths {
    pub config_file: String,
    pub data_dir: String,
    pub state_dir: String,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Paths>,
    pub config: &'a Config,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = args.all.then(|| {
        let xdg = XdgDirs::new();
        Paths {
            config_file: xdg.config_file().display().to_string(),
            data_dir: xdg.data_dir.display().to_string(),
            state_dir: xdg.state_dir.display().to_string(),
        }
    });

    let response = ConfigResponse {
        paths,
        config: services.config.as_ref(),
    };

    match format {
        OutputFormat::Human => {
            if let Some(paths) = &response.paths {
                println!("{} {}", colors::label("# config file:"), paths.config_file);
                println!("{} {}", colors::label("# data dir:"), paths.data_dir);
                println!("{} {}\n", colors::label("# state dir:"), paths.state_dir);
            }
            print!("{}", toml::to_string_pretty(response.config)?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
