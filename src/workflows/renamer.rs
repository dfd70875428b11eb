use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::models::{Episode, MatchedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameMode {
    DryRun,
    Execute,
}

impl RenameMode {
    pub fn from_dryrun(dryrun: bool) -> Self {
        if dryrun {
            RenameMode::DryRun
        } else {
            RenameMode::Execute
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOp {
    pub from: PathBuf,
    pub to: PathBuf,
    /// Set when the source has a non-empty extension, captured or its own.
    pub has_ext: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Previewed,
    Renamed,
    SkippedExisting,
    AlreadyNamed,
    NoExtension,
}

/// `<Name>SxxExx`, the shared stem of an episode's video and subtitle files.
pub fn basename(episode: &Episode) -> String {
    format!(
        "{}S{:02}E{:02}",
        sanitize_filename(&episode.name),
        episode.season,
        episode.episode
    )
}

pub fn generate_filename(episode: &Episode, ext: &str) -> String {
    format!("{}.{}", basename(episode), ext)
}

fn sanitize_filename(name: &str) -> String {
    // Remove or replace invalid filename characters
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Target path for a matched file: same directory, canonical file name.
pub fn target_path(episode: &Episode, file: &MatchedFile) -> PathBuf {
    let directory = file.path.parent().unwrap_or(Path::new("."));
    directory.join(generate_filename(episode, file.ext.as_deref().unwrap_or_default()))
}

/// One operation per side of the episode that has a file, video first.
pub fn plan_renames(episode: &Episode) -> Vec<RenameOp> {
    [episode.video.as_ref(), episode.subtitle.as_ref()]
        .into_iter()
        .flatten()
        .map(|file| RenameOp {
            from: file.path.clone(),
            to: target_path(episode, file),
            has_ext: file.has_ext(),
        })
        .collect()
}

pub fn apply(op: &RenameOp, mode: RenameMode) -> Result<RenameOutcome> {
    if mode == RenameMode::DryRun {
        println!(
            "would move {:?} to {:?}",
            op.from.to_string_lossy(),
            op.to.to_string_lossy()
        );
        return Ok(RenameOutcome::Previewed);
    }

    if !op.has_ext {
        debug!("No extension for {:?}, leaving it in place", op.from);
        return Ok(RenameOutcome::NoExtension);
    }
    if op.from == op.to {
        debug!("{:?} is already named correctly", op.from);
        return Ok(RenameOutcome::AlreadyNamed);
    }
    rename_file(&op.from, &op.to)
}

/// Renames `old_path` unless something already lives at `new_path`.
pub fn rename_file(old_path: &Path, new_path: &Path) -> Result<RenameOutcome> {
    if new_path.exists() {
        println!("skipping existing file {}", new_path.display());
        return Ok(RenameOutcome::SkippedExisting);
    }

    fs::rename(old_path, new_path)
        .with_context(|| format!("Failed to rename {old_path:?} to {new_path:?}"))?;
    info!("Renamed {old_path:?} to {new_path:?}");
    Ok(RenameOutcome::Renamed)
}
