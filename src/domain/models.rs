use std::path::PathBuf;

/// Identifies one episode across the video and subtitle sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeKey {
    pub season: u32,
    pub episode: u32,
}

/// Fields pulled out of a single filename by a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    pub season: u32,
    pub episode: u32,
    pub ext: Option<String>,
}

impl FieldSet {
    pub fn key(&self) -> EpisodeKey {
        EpisodeKey {
            season: self.season,
            episode: self.episode,
        }
    }
}

/// A file on disk matched by one of a show's patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    pub path: PathBuf,
    pub ext: Option<String>,
}

impl MatchedFile {
    /// Whether the pattern captured a usable extension for this file.
    pub fn has_ext(&self) -> bool {
        self.ext.as_deref().is_some_and(|ext| !ext.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub name: String,
    pub season: u32,
    pub episode: u32,
    pub video: Option<MatchedFile>,
    pub subtitle: Option<MatchedFile>,
}

impl Episode {
    pub fn new(name: &str, key: EpisodeKey) -> Self {
        Self {
            name: name.to_string(),
            season: key.season,
            episode: key.episode,
            video: None,
            subtitle: None,
        }
    }

    pub fn key(&self) -> EpisodeKey {
        EpisodeKey {
            season: self.season,
            episode: self.episode,
        }
    }
}
