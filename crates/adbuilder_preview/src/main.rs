// SPDX-License-Identifier: MIT OR Apache-2.0
//! `AdBuilder` Preview - headless timeline player
//!
//! Loads a saved document (elements plus timeline), plays it on the software
//! tween runtime at the driver's fixed tick rate, logs frames, checks that
//! the paused frame matches scrubbing, and writes the static CSS keyframe
//! tables.
//!
//! ```text
//! adbuilder_preview [DOCUMENT.json] [--settings preview.ron] [--out DIR]
//!                   [--write-demo FILE.json] [--write-settings FILE.ron]
//! ```
//!
//! Without a document the built-in demo banner is played.

mod document;
mod error;
mod player;
mod settings;

use clap::Parser;
use document::Document;
use error::Result;
use settings::{PreviewSettings, SETTINGS_FILE_NAME};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Play an ad document headlessly and export its CSS keyframe tables
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "adbuilder_preview")]
#[command(version)]
struct CliArgs {
    /// Document to play (JSON). The demo banner is used when omitted.
    document: Option<PathBuf>,

    /// Settings file (RON)
    #[arg(long, value_name = "FILE.ron")]
    settings: Option<PathBuf>,

    /// Directory for exported stylesheets, overriding the settings
    #[arg(long = "out", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Write the demo document to this path and exit
    #[arg(long, value_name = "FILE.json")]
    write_demo: Option<PathBuf>,

    /// Write default settings to this path and exit
    #[arg(long, value_name = "FILE.ron")]
    write_settings: Option<PathBuf>,
}

fn run(args: CliArgs) -> Result<()> {
    if args.write_demo.is_some() || args.write_settings.is_some() {
        if let Some(path) = &args.write_demo {
            Document::demo().save(path)?;
            tracing::info!("Wrote demo document to {}", path.display());
        }
        if let Some(path) = &args.write_settings {
            PreviewSettings::default().save(path)?;
            tracing::info!("Wrote default settings to {}", path.display());
        }
        return Ok(());
    }

    let settings_path = args.settings.clone().unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
    let mut settings = PreviewSettings::load_or_default(&settings_path)?;
    if let Some(dir) = args.output_dir {
        settings.output_dir = dir;
    }

    let (document, stem) = match &args.document {
        Some(path) => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            (Document::load(path)?, stem)
        }
        None => {
            tracing::info!("No document given, playing the demo banner");
            (Document::demo(), "demo".to_string())
        }
    };

    for (element, properties) in document.animation_summary() {
        let names: Vec<&str> = properties.iter().map(|p| p.name()).collect();
        tracing::info!("{} animates {}", element, names.join(", "));
    }

    let report = player::play(&document, &settings)?;
    if report.max_sync_error > 1e-6 {
        tracing::warn!("Paused frame drifted from scrub sample by {:.3e}", report.max_sync_error);
    }
    player::export_stylesheet(&document, &settings, &stem)?;
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("adbuilder_preview=info,adbuilder_timeline=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AdBuilder Preview v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args) {
        tracing::error!("Preview failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> std::result::Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("adbuilder_preview").chain(list.iter().copied()))
    }

    #[test]
    fn test_parse_full_command_line() {
        let parsed = args(&["ad.json", "--settings", "p.ron", "--out", "css"]).unwrap();
        assert_eq!(parsed.document, Some(PathBuf::from("ad.json")));
        assert_eq!(parsed.settings, Some(PathBuf::from("p.ron")));
        assert_eq!(parsed.output_dir, Some(PathBuf::from("css")));
    }

    #[test]
    fn test_parse_write_flags() {
        let parsed = args(&["--write-demo", "demo.json", "--write-settings", "preview.ron"]).unwrap();
        assert_eq!(parsed.write_demo, Some(PathBuf::from("demo.json")));
        assert_eq!(parsed.write_settings, Some(PathBuf::from("preview.ron")));
        assert_eq!(parsed.document, None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(args(&["--out"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
        assert_eq!(args(&[]).unwrap(), CliArgs::default());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
