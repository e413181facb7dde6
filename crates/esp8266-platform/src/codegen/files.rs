//! Bundled build files and firmware download descriptions.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::codegen::emit::POST_BUILD_SCRIPT;
use crate::context::{ExtraFile, Registry};
use crate::error::Result;

const POST_BUILD_CONTENTS: &str = include_str!("../../assets/post_build.py.script");

/// A file shipped inside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundledAsset {
    PostBuildScript,
}

impl BundledAsset {
    pub fn contents(&self) -> &'static str {
        match self {
            BundledAsset::PostBuildScript => POST_BUILD_CONTENTS,
        }
    }
}

/// A firmware artifact offered for download after a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadType {
    pub title: String,
    pub description: String,
    /// File name inside the build output.
    pub file: String,
    /// Suggested name for the downloaded file.
    pub download: String,
}

/// Downloadable artifacts for a device called `name`.
pub fn download_types(name: &str) -> Vec<DownloadType> {
    vec![DownloadType {
        title: "Standard format".into(),
        description: "For flashing ESP8266.".into(),
        file: "firmware.bin".into(),
        download: format!("{name}.bin"),
    }]
}

/// Write the bundled post-build script into `build_dir`.
///
/// Returns `false` when the destination already held identical contents.
pub fn copy_files(build_dir: &Path) -> Result<bool> {
    let script = BundledAsset::PostBuildScript.contents();
    write_if_changed(script.as_bytes(), &build_dir.join(POST_BUILD_SCRIPT))
}

/// Copy every registered extra build file into `build_dir`.
///
/// Returns the number of files actually written.
pub fn copy_extra_build_files(files: &Registry<ExtraFile>, build_dir: &Path) -> Result<usize> {
    let mut written = 0;
    for (filename, source) in files.iter() {
        let contents = match source {
            ExtraFile::Bundled(asset) => asset.contents().as_bytes().to_vec(),
            ExtraFile::Path(path) => std::fs::read(path)?,
        };
        if write_if_changed(&contents, &build_dir.join(filename))? {
            written += 1;
        }
    }
    Ok(written)
}

/// Write `contents` to `dest` unless it already has the same SHA-256 digest.
pub fn write_if_changed(contents: &[u8], dest: &Path) -> Result<bool> {
    if let Ok(existing) = std::fs::read(dest) {
        if Sha256::digest(&existing) == Sha256::digest(contents) {
            tracing::trace!(path = %dest.display(), "unchanged, skipping write");
            return Ok(false);
        }
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, contents)?;
    tracing::debug!(path = %dest.display(), bytes = contents.len(), "wrote build file");
    Ok(true)
}
