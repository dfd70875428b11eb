use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::workflows::matchers::pattern::{CaptureField, CompiledPattern, PatternError};

pub const CONFIG_ENV_VAR: &str = "EPISODE_RENAMER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed YAML config {path:?}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("malformed TOML config {path:?}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("show {show:?}: bad {field}")]
    Pattern {
        show: String,
        field: &'static str,
        #[source]
        source: PatternError,
    },
}

/// One show entry as written in the config file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShowConfig {
    name: String,
    video_regex: String,
    subtitle_regex: String,
}

#[derive(Debug, Deserialize)]
struct TomlConfigFile {
    #[serde(default)]
    show: Vec<RawShowConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// `.toml` selects TOML, anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// A show's name and its compiled video/subtitle patterns.
#[derive(Debug, Clone)]
pub struct ShowConfig {
    pub name: String,
    pub video: CompiledPattern,
    pub subtitle: CompiledPattern,
}

impl ShowConfig {
    pub fn new(name: &str, video_regex: &str, subtitle_regex: &str) -> Result<Self, ConfigError> {
        let compile = |field: &'static str, source: &str| {
            CompiledPattern::new(source).map_err(|source| ConfigError::Pattern {
                show: name.to_string(),
                field,
                source,
            })
        };
        let show = Self {
            name: name.to_string(),
            video: compile("videoRegex", video_regex)?,
            subtitle: compile("subtitleRegex", subtitle_regex)?,
        };
        for (field, pattern) in [("videoRegex", &show.video), ("subtitleRegex", &show.subtitle)] {
            if !pattern.defines(CaptureField::Extension) {
                debug!("{name}: {field} has no ext group, using the matched file's extension");
            }
        }
        Ok(show)
    }
}

impl fmt::Display for ShowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})\n\tVideoRegex: {}\n\tSubtitleRegex: {}",
            self.name, self.video, self.subtitle
        )
    }
}

pub fn load_config(path: &Path) -> Result<Vec<ShowConfig>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, ConfigFormat::from_path(path), path)
}

pub fn parse_config(
    content: &str,
    format: ConfigFormat,
    path: &Path,
) -> Result<Vec<ShowConfig>, ConfigError> {
    let raw: Vec<RawShowConfig> = match format {
        ConfigFormat::Yaml => {
            // An empty document deserializes to unit, not a sequence
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })?
            }
        }
        ConfigFormat::Toml => {
            let file: TomlConfigFile =
                toml::from_str(content).map_err(|source| ConfigError::Toml {
                    path: path.to_path_buf(),
                    source,
                })?;
            file.show
        }
    };

    raw.iter()
        .map(|show| ShowConfig::new(&show.name, &show.video_regex, &show.subtitle_regex))
        .collect()
}

/// Picks the config file to load: the requested path if it exists, then
/// `$EPISODE_RENAMER_CONFIG`, then `<config dir>/episode-renamer/config.yaml`.
pub fn resolve_config_path(requested: &Path) -> PathBuf {
    let env_override = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let user_config = get_config_dir_path().map(|dir| dir.join("config.yaml"));
    resolve_config_path_with(requested, env_override, user_config)
}

fn resolve_config_path_with(
    requested: &Path,
    env_override: Option<PathBuf>,
    user_config: Option<PathBuf>,
) -> PathBuf {
    if requested.exists() {
        return requested.to_path_buf();
    }
    if let Some(path) = env_override {
        debug!("{requested:?} not found, using {CONFIG_ENV_VAR}={path:?}");
        return path;
    }
    if let Some(path) = user_config.filter(|p| p.exists()) {
        debug!("{requested:?} not found, using {path:?}");
        return path;
    }
    // Let the read fail on the path the user asked for
    requested.to_path_buf()
}

fn get_config_dir_path() -> Option<PathBuf> {
    xdir::config().map(|path| path.join("episode-renamer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    const YAML: &str = r#"
- name: Show
  videoRegex: '(?P<episode>\d+)\.(?P<ext>mkv)'
  subtitleRegex: '(?P<episode>\d+)\.(?P<ext>srt)'
- name: Other
  videoRegex: 'S(?P<season>\d+)E(?P<episode>\d+)\.(?P<ext>mp4)'
  subtitleRegex: 'S(?P<season>\d+)E(?P<episode>\d+)\.(?P<ext>ass)'
"#;

    #[test]
    fn test_parse_yaml_keeps_order() {
        let shows = parse_config(YAML, ConfigFormat::Yaml, Path::new("config.yaml")).unwrap();
        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].name, "Show");
        assert_eq!(shows[1].name, "Other");
        assert_eq!(shows[0].video.as_str(), r"(?P<episode>\d+)\.(?P<ext>mkv)");
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
[[show]]
name = "Show"
videoRegex = '(?P<episode>\d+)\.(?P<ext>mkv)'
subtitleRegex = '(?P<episode>\d+)\.(?P<ext>srt)'
"#;
        let shows = parse_config(content, ConfigFormat::Toml, Path::new("config.toml")).unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].subtitle.as_str(), r"(?P<episode>\d+)\.(?P<ext>srt)");
    }

    #[test]
    fn test_empty_yaml_is_no_shows() {
        let shows = parse_config("", ConfigFormat::Yaml, Path::new("config.yaml")).unwrap();
        assert!(shows.is_empty());
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let content = "- name: Show\n  videoRegex: 'x'\n";
        let err = parse_config(content, ConfigFormat::Yaml, Path::new("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_bad_regex_names_show_and_field() {
        let content = "- name: Show\n  videoRegex: '(?P<episode>\\d+'\n  subtitleRegex: 'x'\n";
        let err = parse_config(content, ConfigFormat::Yaml, Path::new("config.yaml")).unwrap_err();
        match err {
            ConfigError::Pattern { show, field, source } => {
                assert_eq!(show, "Show");
                assert_eq!(field, "videoRegex");
                assert!(matches!(source, PatternError::Regex(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_group_fails_at_load() {
        let content = "- name: Show\n  videoRegex: 'x'\n  subtitleRegex: '(?P<lang>\\w+)\\.srt'\n";
        let err = parse_config(content, ConfigFormat::Yaml, Path::new("config.yaml")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Pattern {
                field: "subtitleRegex",
                source: PatternError::UnknownGroup(_),
                ..
            }
        ));
    }

    #[test]
    fn test_load_config_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_config(&temp_dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, YAML).unwrap();
        assert_eq!(load_config(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_resolve_prefers_existing_request() {
        let temp_dir = TempDir::new().unwrap();
        let requested = temp_dir.path().join("config.yaml");
        File::create(&requested).unwrap();

        let resolved =
            resolve_config_path_with(&requested, Some(PathBuf::from("/elsewhere.yaml")), None);
        assert_eq!(resolved, requested);
    }

    #[test]
    fn test_resolve_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let requested = temp_dir.path().join("config.yaml");
        let user_config = temp_dir.path().join("user.yaml");

        let resolved =
            resolve_config_path_with(&requested, Some(PathBuf::from("/env.yaml")), None);
        assert_eq!(resolved, PathBuf::from("/env.yaml"));

        // A user config that does not exist is not used
        let resolved = resolve_config_path_with(&requested, None, Some(user_config.clone()));
        assert_eq!(resolved, requested);

        File::create(&user_config).unwrap();
        let resolved = resolve_config_path_with(&requested, None, Some(user_config.clone()));
        assert_eq!(resolved, user_config);
    }
}
