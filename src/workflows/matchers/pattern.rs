use regex::Regex;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::Matcher;
use crate::domain::models::FieldSet;

/// Season used for shows whose pattern captures no season.
pub const DEFAULT_SEASON: u32 = 1;
/// Episode used when the pattern captures no episode.
pub const DEFAULT_EPISODE: u32 = 0;

/// What a capture group of a filename pattern feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureField {
    Season,
    Episode,
    Extension,
    Ignored,
}

impl CaptureField {
    /// Classifies a capture group by name. Unnamed groups are ignored,
    /// names outside the recognized set are rejected.
    pub fn from_group_name(name: Option<&str>) -> Result<Self, PatternError> {
        match name {
            None => Ok(CaptureField::Ignored),
            Some("season") => Ok(CaptureField::Season),
            Some("episode") => Ok(CaptureField::Episode),
            Some("ext") => Ok(CaptureField::Extension),
            Some(other) => Err(PatternError::UnknownGroup(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
    #[error("unknown named capture group {0:?} (expected season, episode or ext)")]
    UnknownGroup(String),
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("capture group {group} of {file_name:?} is not a valid number: {value:?}")]
    InvalidNumber {
        group: &'static str,
        value: String,
        file_name: String,
    },
}

/// A filename regex whose named groups have been validated and classified.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    fields: Vec<(usize, CaptureField)>,
}

impl CompiledPattern {
    pub fn new(source: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(source)?;
        let mut fields = Vec::new();
        // Group 0 is the whole match and never has a name.
        for (idx, name) in regex.capture_names().enumerate().skip(1) {
            match CaptureField::from_group_name(name)? {
                CaptureField::Ignored => {}
                field => fields.push((idx, field)),
            }
        }
        Ok(Self { regex, fields })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn defines(&self, field: CaptureField) -> bool {
        self.fields.iter().any(|(_, f)| *f == field)
    }
}

impl Matcher for CompiledPattern {
    fn match_file(&self, file_name: &str) -> Result<Option<FieldSet>, MatchError> {
        let Some(caps) = self.regex.captures(file_name) else {
            return Ok(None);
        };

        let mut season = None;
        let mut episode = None;
        let mut ext = None;
        for (idx, field) in &self.fields {
            // Optional groups that did not participate count as absent
            let Some(m) = caps.get(*idx) else {
                continue;
            };
            if matches!(field, CaptureField::Season | CaptureField::Episode)
                && is_non_ascii_number(m.as_str())
            {
                // `\d` is Unicode-aware; only ASCII digits count as a match
                debug!("Ignoring {file_name:?}: non-ASCII digits {:?}", m.as_str());
                return Ok(None);
            }
            match field {
                CaptureField::Season => {
                    season = Some(parse_number("season", m.as_str(), file_name)?)
                }
                CaptureField::Episode => {
                    episode = Some(parse_number("episode", m.as_str(), file_name)?)
                }
                CaptureField::Extension => ext = Some(m.as_str().to_string()),
                CaptureField::Ignored => {}
            }
        }

        Ok(Some(FieldSet {
            season: season.unwrap_or(DEFAULT_SEASON),
            episode: episode.unwrap_or(DEFAULT_EPISODE),
            ext: ext.or_else(|| file_extension(file_name)),
        }))
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_non_ascii_number(value: &str) -> bool {
    value.chars().all(char::is_numeric) && !value.bytes().all(|b| b.is_ascii_digit())
}

/// Extension of the file itself, used when the pattern captures none.
fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_string)
}

fn parse_number(group: &'static str, value: &str, file_name: &str) -> Result<u32, MatchError> {
    value.parse().map_err(|_| MatchError::InvalidNumber {
        group,
        value: value.to_string(),
        file_name: file_name.to_string(),
    })
}
