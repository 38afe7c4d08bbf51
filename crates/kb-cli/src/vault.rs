//! Vault crawling: find processable files under a root directory.

use anyhow::{Context, Result};
use globset::GlobSet;
use std::path::{Path, PathBuf};

/// A discovered document: its vault-relative path (with `/` separators, used
/// for identity) and its absolute path on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    pub rel_path: String,
    pub abs_path: PathBuf,
}

/// Walk `root` for files with one of `extensions`, honoring gitignore rules
/// and skipping hidden entries. Results are sorted bytewise by relative path
/// so a run over the same vault is deterministic.
pub fn crawl(
    root: &Path,
    extensions: &[String],
    include: Option<&GlobSet>,
    exclude: Option<&GlobSet>,
) -> Result<Vec<VaultFile>> {
    let walker = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.context("vault walk failed")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if !has_extension(rel, extensions) {
            continue;
        }
        if let Some(inc) = include
            && !inc.is_match(rel)
        {
            continue;
        }
        if let Some(exc) = exclude
            && exc.is_match(rel)
        {
            continue;
        }
        files.push(VaultFile {
            rel_path: rel_path_string(rel),
            abs_path: path.to_path_buf(),
        });
    }
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let lower = name.to_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
}

/// Vault-relative path with `/` separators, as the pipeline receives it.
fn rel_path_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
