//! Post asset sync
//!
//! Files referenced by posts live next to them in the assets directory and
//! are copied verbatim to the public directory. The destination is cleared
//! first so removed assets do not linger.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Names never copied
const SKIPPED: &[&str] = &[".DS_Store"];

/// Replace `dest` with a fresh copy of `src`.
///
/// Only regular files and directories are copied; symlinks are skipped.
/// Returns `false` without touching `dest` when `src` does not exist.
pub fn sync(src: &Path, dest: &Path) -> Result<bool> {
    if !src.is_dir() {
        tracing::info!("No post assets found at: {:?}", src);
        return Ok(false);
    }

    if dest.exists() {
        fs::remove_dir_all(dest).with_context(|| format!("Failed to remove {:?}", dest))?;
    }
    fs::create_dir_all(dest)?;

    let mut copied = 0usize;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for entry in walker {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?}", entry.path()))?;
            copied += 1;
        } else {
            tracing::debug!("Skipping non-regular entry: {:?}", entry.path());
        }
    }

    tracing::info!("Synced {} post assets to: {:?}", copied, dest);
    Ok(true)
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| SKIPPED.contains(&name))
        .unwrap_or(false)
}
