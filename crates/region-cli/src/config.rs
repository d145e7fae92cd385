//! Command-line and file configuration for `generate`.
//!
//! Layers, later wins: defaults, `generate.toml`, environment, flags.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

/// Config file looked up in the content root when `--config` is not given.
pub const CONFIG_FILE: &str = "generate.toml";

pub const DEFAULT_LANG: &str = "en";

/// Generate a region datafile from a content directory.
#[derive(Debug, Parser)]
#[command(name = "generate", version, about)]
pub struct Cli {
    /// Region content root
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Language code of the localized text files
    #[arg(short, long, env = "REGION_LANG")]
    pub lang: Option<String>,

    /// Output file, or `-` for stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON datafile
    #[arg(long)]
    pub pretty: bool,

    /// Load independent collections concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Exit with an error if any referenced image is missing
    #[arg(long)]
    pub deny_missing_assets: bool,

    /// Log every resolved image path
    #[arg(long)]
    pub list_images: bool,

    /// Config file (defaults to `<ROOT>/generate.toml` when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// The optional file layer. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub lang: Option<String>,
    pub output: Option<PathBuf>,
    pub pretty: Option<bool>,
    pub parallel: Option<bool>,
    pub deny_missing_assets: Option<bool>,
    pub list_images: Option<bool>,
}

impl FileConfig {
    /// Read `path`. A missing file is an empty layer unless `required`.
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Self> {
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))
    }
}

/// Where the datafile goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    fn from_path(path: PathBuf) -> Self {
        if path.as_os_str() == "-" {
            Output::Stdout
        } else {
            Output::File(path)
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    pub root: PathBuf,
    pub lang: String,
    pub output: Output,
    pub pretty: bool,
    pub parallel: bool,
    pub deny_missing_assets: bool,
    pub list_images: bool,
}

impl GenerateConfig {
    /// Load the file layer named by `cli` and merge everything.
    pub fn resolve(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path, true)?,
            None => FileConfig::load(&cli.root.join(CONFIG_FILE), false)?,
        };
        Ok(Self::merge(cli, file))
    }

    /// Flags override the file; boolean flags can only switch a setting on.
    pub fn merge(cli: Cli, file: FileConfig) -> Self {
        let output = cli
            .output
            .or(file.output)
            .map(Output::from_path)
            .unwrap_or(Output::Stdout);

        Self {
            root: cli.root,
            lang: cli
                .lang
                .or(file.lang)
                .unwrap_or_else(|| DEFAULT_LANG.to_string()),
            output,
            pretty: cli.pretty || file.pretty.unwrap_or(false),
            parallel: cli.parallel || file.parallel.unwrap_or(false),
            deny_missing_assets: cli.deny_missing_assets
                || file.deny_missing_assets.unwrap_or(false),
            list_images: cli.list_images || file.list_images.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["generate"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn temp_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "region_cli_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults() {
        let config = GenerateConfig::merge(
            Cli {
                lang: None,
                ..cli(&[])
            },
            FileConfig::default(),
        );
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.lang, DEFAULT_LANG);
        assert_eq!(config.output, Output::Stdout);
        assert!(!config.pretty);
        assert!(!config.parallel);
    }

    #[test]
    fn file_layer_fills_unset_flags() {
        let file: FileConfig = toml::from_str(
            r#"
lang = "pl"
output = "out/datafile.json"
pretty = true
deny_missing_assets = true
"#,
        )
        .unwrap();

        let config = GenerateConfig::merge(
            Cli {
                lang: None,
                ..cli(&["regions/krakow"])
            },
            file,
        );
        assert_eq!(config.root, PathBuf::from("regions/krakow"));
        assert_eq!(config.lang, "pl");
        assert_eq!(config.output, Output::File(PathBuf::from("out/datafile.json")));
        assert!(config.pretty);
        assert!(config.deny_missing_assets);
        assert!(!config.list_images);
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig {
            lang: Some("pl".to_string()),
            output: Some(PathBuf::from("datafile.json")),
            ..FileConfig::default()
        };

        let config = GenerateConfig::merge(
            cli(&["--lang", "de", "-o", "-", "--parallel", "--list-images"]),
            file,
        );
        assert_eq!(config.lang, "de");
        assert_eq!(config.output, Output::Stdout);
        assert!(config.parallel);
        assert!(config.list_images);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("language = \"pl\"");
        assert!(result.is_err());
    }

    #[test]
    fn config_file_in_root_is_optional() {
        let dir = temp_dir("optional");
        let config = GenerateConfig::resolve(Cli {
            lang: None,
            ..cli(&[dir.to_str().unwrap()])
        })
        .unwrap();
        assert_eq!(config.lang, DEFAULT_LANG);

        std::fs::write(dir.join(CONFIG_FILE), "lang = \"uk\"\n").unwrap();
        let config = GenerateConfig::resolve(Cli {
            lang: None,
            ..cli(&[dir.to_str().unwrap()])
        })
        .unwrap();
        assert_eq!(config.lang, "uk");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = temp_dir("explicit");
        let missing = dir.join("nope.toml");

        let result = GenerateConfig::resolve(cli(&["--config", missing.to_str().unwrap()]));
        assert!(result.is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
