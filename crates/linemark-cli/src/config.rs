// SPDX-License-Identifier: AGPL-3.0-or-later
//! `linemark.toml` loading and merging with command-line flags

use anyhow::{Context, Result};
use linemark_core::{OutputFormat, RenderConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up next to each input
pub const CONFIG_FILE: &str = "linemark.toml";

/// Contents of a `linemark.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub format: Option<OutputFormat>,
    pub stylesheets: Vec<PathBuf>,
    pub embed: Option<bool>,
    pub lang: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Use `explicit` if given, else a `linemark.toml` beside `input`, else defaults.
    pub fn discover(explicit: Option<&Path>, input: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(config = %candidate.display(), "using discovered config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

/// Flags that can override the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub format: Option<OutputFormat>,
    pub stylesheets: Vec<PathBuf>,
    pub no_embed: bool,
    pub lang: Option<String>,
}

/// Effective settings for converting one input
#[derive(Debug)]
pub struct Settings {
    pub format: OutputFormat,
    pub render: RenderConfig,
    pub output_dir: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(file: FileConfig, flags: &Overrides) -> Self {
        let format = flags.format.or(file.format).unwrap_or(OutputFormat::Html);
        let stylesheets = if flags.stylesheets.is_empty() {
            file.stylesheets
        } else {
            flags.stylesheets.clone()
        };
        let embed = !flags.no_embed && file.embed.unwrap_or(true);

        let mut render = RenderConfig::default().with_embed_stylesheets(embed);
        for stylesheet in stylesheets {
            render = render.with_stylesheet(stylesheet);
        }
        if let Some(lang) = flags.lang.clone().or(file.lang) {
            render = render.with_lang(lang);
        }

        Self {
            format,
            render,
            output_dir: file.output_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parses_every_key() {
        let config: FileConfig = toml::from_str(
            "format = \"markdown\"\nstylesheets = [\"a.css\"]\nembed = false\nlang = \"en\"\noutput_dir = \"out\"\n",
        )
        .unwrap();
        assert_eq!(config.format, Some(OutputFormat::Markdown));
        assert_eq!(config.stylesheets, vec![PathBuf::from("a.css")]);
        assert_eq!(config.embed, Some(false));
        assert_eq!(config.lang.as_deref(), Some("en"));
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(toml::from_str::<FileConfig>("colour = \"red\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            format: Some(OutputFormat::Xml),
            stylesheets: vec!["file.css".into()],
            embed: Some(true),
            lang: Some("de".into()),
            output_dir: None,
        };
        let flags = Overrides {
            format: Some(OutputFormat::Blog),
            stylesheets: vec!["flag.css".into()],
            no_embed: true,
            lang: None,
        };
        let settings = Settings::resolve(file, &flags);
        assert_eq!(settings.format, OutputFormat::Blog);
        assert_eq!(settings.render.stylesheets, vec![PathBuf::from("flag.css")]);
        assert!(!settings.render.embed_stylesheets);
        assert_eq!(settings.render.lang, "de");
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::resolve(FileConfig::default(), &Overrides::default());
        assert_eq!(settings.format, OutputFormat::Html);
        assert!(settings.render.embed_stylesheets);
        assert_eq!(settings.render.lang, "fr");
        assert!(settings.output_dir.is_none());
    }

    #[test]
    fn test_discovers_config_beside_input() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "format = \"xml\"\n").unwrap();
        let input = dir.path().join("doc.txt");

        let config = FileConfig::discover(None, &input).unwrap();
        assert_eq!(config.format, Some(OutputFormat::Xml));

        let other = TempDir::new().unwrap();
        let config = FileConfig::discover(None, &other.path().join("doc.txt")).unwrap();
        assert_eq!(config, FileConfig::default());
    }
}
