//! Sources for external SDK components.
//!
//! A source is either a table (`type = "git"` with `url`/`ref`, or
//! `type = "local"` with `path`) or a shorthand string: an existing local
//! directory, or `github://owner/repo[@ref]`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};

/// Where an SDK component is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentSource {
    Git {
        url: String,
        #[serde(rename = "ref")]
        git_ref: Option<String>,
    },
    Local {
        path: PathBuf,
    },
}

impl ComponentSource {
    pub fn is_git(&self) -> bool {
        matches!(self, ComponentSource::Git { .. })
    }
}

/// A component `source` as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSource {
    /// A local directory or `github://owner/repo[@ref]`.
    Shorthand(String),
    Table(SourceTable),
}

/// The table form of a component source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum SourceTable {
    Git {
        url: String,
        #[serde(default, rename = "ref")]
        git_ref: Option<String>,
    },
    Local {
        path: String,
    },
}

/// Validate a component `source`, resolving local paths against `base_dir`.
pub fn validate_source(raw: &RawSource, path: &str, base_dir: &Path) -> Result<ComponentSource> {
    match raw {
        RawSource::Shorthand(shorthand) => validate_shorthand(shorthand, path, base_dir),
        RawSource::Table(SourceTable::Git { url, git_ref }) => Ok(ComponentSource::Git {
            url: url.clone(),
            git_ref: git_ref.clone(),
        }),
        RawSource::Table(SourceTable::Local { path: dir }) => {
            local_directory(dir, &format!("{path}.path"), base_dir)
        }
    }
}

fn validate_shorthand(value: &str, path: &str, base_dir: &Path) -> Result<ComponentSource> {
    if let Ok(local) = local_directory(value, path, base_dir) {
        return Ok(local);
    }
    let (url, git_ref) = parse_github_shorthand(value).ok_or_else(|| {
        PlatformError::schema(
            path,
            "Source is not a file system path or in expected \
             github://username/name[@branch-or-tag] format!",
        )
    })?;
    Ok(ComponentSource::Git { url, git_ref })
}

fn local_directory(dir: &str, path: &str, base_dir: &Path) -> Result<ComponentSource> {
    let resolved = base_dir.join(dir);
    if !resolved.is_dir() {
        return Err(PlatformError::schema(
            path,
            format!("directory '{}' does not exist", resolved.display()),
        ));
    }
    Ok(ComponentSource::Local { path: resolved })
}

/// Expand `github://owner/repo[@ref]` into a clone URL and optional ref.
pub fn parse_github_shorthand(value: &str) -> Option<(String, Option<String>)> {
    let rest = value.strip_prefix("github://")?;
    let (repo_part, git_ref) = match rest.split_once('@') {
        Some((repo, r)) => (repo, Some(r)),
        None => (rest, None),
    };
    let (owner, name) = repo_part.split_once('/')?;

    let valid_owner = !owner.is_empty() && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));
    let valid_ref = git_ref.map_or(true, |r| {
        !r.is_empty()
            && r
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
    });
    if !(valid_owner && valid_name && valid_ref) {
        return None;
    }

    Some((
        format!("https://github.com/{owner}/{name}.git"),
        git_ref.map(str::to_string),
    ))
}
