use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::ShowConfig;
use crate::domain::models::{Episode, EpisodeKey, FieldSet, MatchedFile};
use crate::workflows::matchers::pattern::MatchError;
use crate::workflows::matchers::Matcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Video,
    Subtitle,
}

type SideMatches = BTreeMap<EpisodeKey, MatchedFile>;

/// Tests a filename against the video pattern, and only when that does not
/// match, against the subtitle pattern.
pub fn classify(
    file_name: &str,
    video: &impl Matcher,
    subtitle: &impl Matcher,
) -> Result<Option<(Side, FieldSet)>, MatchError> {
    if let Some(fields) = video.match_file(file_name)? {
        return Ok(Some((Side::Video, fields)));
    }
    Ok(subtitle
        .match_file(file_name)?
        .map(|fields| (Side::Subtitle, fields)))
}

/// Walks `dir` recursively and groups the show's video and subtitle files by
/// (season, episode).
pub fn find_episodes(dir: &Path, show: &ShowConfig) -> Result<BTreeMap<EpisodeKey, Episode>> {
    let mut videos = SideMatches::new();
    let mut subtitles = SideMatches::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {dir:?}"))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            debug!("Skipping non UTF-8 file name {:?}", entry.path());
            continue;
        };

        let classified = classify(file_name, &show.video, &show.subtitle)
            .with_context(|| format!("Failed to match {:?}", entry.path()))?;
        match classified {
            Some((Side::Video, fields)) => {
                record(&mut videos, Side::Video, fields, entry.path().to_path_buf())
            }
            Some((Side::Subtitle, fields)) => {
                record(&mut subtitles, Side::Subtitle, fields, entry.path().to_path_buf())
            }
            None => {}
        }
    }

    debug!(
        "{}: {} video and {} subtitle match(es) in {dir:?}",
        show.name,
        videos.len(),
        subtitles.len()
    );
    Ok(merge(&show.name, videos, subtitles))
}

fn record(matches: &mut SideMatches, side: Side, fields: FieldSet, path: PathBuf) {
    let key = fields.key();
    let file = MatchedFile {
        path,
        ext: fields.ext,
    };
    if let Some(previous) = matches.insert(key, file) {
        warn!(
            "{side:?} S{:02}E{:02}: {:?} replaces {:?}",
            key.season,
            key.episode,
            matches[&key].path,
            previous.path
        );
    }
}

/// Combines both sides into one episode per key. An episode exists as soon
/// as either side matched.
pub fn merge(
    name: &str,
    videos: SideMatches,
    subtitles: SideMatches,
) -> BTreeMap<EpisodeKey, Episode> {
    let mut episodes = BTreeMap::new();
    for (key, file) in videos {
        episodes
            .entry(key)
            .or_insert_with(|| Episode::new(name, key))
            .video = Some(file);
    }
    for (key, file) in subtitles {
        episodes
            .entry(key)
            .or_insert_with(|| Episode::new(name, key))
            .subtitle = Some(file);
    }
    episodes
}
