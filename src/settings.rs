//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `ELECTION_REPORT_*` environment variables. Command-line flags are applied
//! last by the caller through [`Overrides`].

use crate::normalizers::{NameNormalizer, DEFAULT_NAME_PREFIXES};
use crate::pipeline::{PipelineSettings, DEFAULT_CANDIDATE_NAME_COLUMN};
use crate::source::cache::DEFAULT_TTL;
use crate::source::{LocalSource, RemoteSource, Source, SourceError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "election-report.toml";
pub const ENV_PREFIX: &str = "ELECTION_REPORT";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("source could not be built: {0}")]
    Source(#[from] SourceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceKind,
    pub snapshot_dir: PathBuf,
    pub remote_base_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub candidate_name_column: String,
    pub name_prefixes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source: SourceKind::Local,
            snapshot_dir: PathBuf::from("snapshot"),
            remote_base_url: None,
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            request_timeout_secs: 30,
            candidate_name_column: DEFAULT_CANDIDATE_NAME_COLUMN.to_string(),
            name_prefixes: DEFAULT_NAME_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Values given on the command line. `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<SourceKind>,
    pub snapshot_dir: Option<PathBuf>,
    pub remote_base_url: Option<String>,
    pub candidate_name_column: Option<String>,
}

impl Settings {
    /// Read settings from `path` (skipped if absent) and the environment.
    pub fn load(path: &Path) -> Result<Settings, SettingsError> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: &Path, env: config::Environment) -> Result<Settings, SettingsError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(dir) = overrides.snapshot_dir {
            self.snapshot_dir = dir;
        }
        if let Some(url) = overrides.remote_base_url {
            self.remote_base_url = Some(url);
        }
        if let Some(column) = overrides.candidate_name_column {
            self.candidate_name_column = column;
        }
    }

    pub fn build_source(&self) -> Result<Source, SettingsError> {
        match self.source {
            SourceKind::Local => Ok(Source::Local(LocalSource::new(&self.snapshot_dir))),
            SourceKind::Remote => {
                let base_url = self.remote_base_url.as_deref().ok_or_else(|| {
                    SourceError::Config("remote source selected but remote_base_url is unset".into())
                })?;
                let remote = RemoteSource::new(
                    base_url,
                    Duration::from_secs(self.cache_ttl_secs),
                    Duration::from_secs(self.request_timeout_secs),
                )?;
                Ok(Source::Remote(remote))
            }
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            candidate_name_column: self.candidate_name_column.clone(),
            normalizer: NameNormalizer::new(self.name_prefixes.iter().cloned()),
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("name_prefixes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cache_ttl_secs, 300);
        assert_eq!(settings.candidate_name_column, "mp_app_name");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("election-report.toml");
        fs::write(
            &path,
            r#"
source = "remote"
remote_base_url = "https://example.test/data"
cache_ttl_secs = 60
candidate_name_column = "name"
name_prefixes = ["ดร."]
"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.source, SourceKind::Remote);
        assert_eq!(settings.remote_base_url.as_deref(), Some("https://example.test/data"));
        assert_eq!(settings.cache_ttl_secs, 60);
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.name_prefixes, vec!["ดร.".to_string()]);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("election-report.toml");
        fs::write(&path, "cache_ttl_secs = 60\ncandidate_name_column = \"name\"\n").unwrap();

        let vars: config::Map<String, String> = [
            ("ELECTION_REPORT_CACHE_TTL_SECS", "120"),
            ("ELECTION_REPORT_SOURCE", "remote"),
            ("ELECTION_REPORT_NAME_PREFIXES", "ดร.,นาย"),
            ("UNRELATED_VAR", "ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let settings = Settings::load_with_env(&path, environment().source(Some(vars))).unwrap();
        assert_eq!(settings.cache_ttl_secs, 120);
        assert_eq!(settings.source, SourceKind::Remote);
        assert_eq!(settings.candidate_name_column, "name");
        assert_eq!(settings.name_prefixes, vec!["ดร.".to_string(), "นาย".to_string()]);
    }

    #[test]
    fn command_line_overrides_win() {
        let mut settings = Settings::default();
        settings.apply(Overrides {
            source: Some(SourceKind::Remote),
            remote_base_url: Some("http://localhost:1".into()),
            ..Overrides::default()
        });
        assert_eq!(settings.source, SourceKind::Remote);
        assert_eq!(settings.snapshot_dir, PathBuf::from("snapshot"));
        assert!(matches!(settings.build_source(), Ok(Source::Remote(_))));
    }

    #[test]
    fn remote_without_url_is_rejected() {
        let settings = Settings {
            source: SourceKind::Remote,
            ..Settings::default()
        };
        assert!(matches!(
            settings.build_source(),
            Err(SettingsError::Source(SourceError::Config(_)))
        ));
    }

    #[test]
    fn pipeline_settings_use_configured_prefixes() {
        let settings = Settings {
            name_prefixes: vec!["ดร.".into()],
            ..Settings::default()
        };
        let pipeline = settings.pipeline_settings();
        assert_eq!(pipeline.normalizer.normalize("ดร.สมชาย"), "สมชาย");
        assert_eq!(pipeline.normalizer.normalize("นายสมชาย"), "นายสมชาย");
    }
}
