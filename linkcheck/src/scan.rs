use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{LinkCheckError, Result};
use crate::links::{extract_hrefs, is_external, local_target};

#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// Extensions of pages to scan, with or without the leading dot.
    pub extensions: Vec<String>,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extensions: vec!["html".to_string()],
            skip_dirs: vec!["node_modules".to_string(), ".git".to_string()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingLink {
    /// Page containing the link, relative to the root.
    pub from: PathBuf,
    pub href: String,
    /// Where the link was expected to land, relative to the root when inside it.
    pub resolved: PathBuf,
}

#[derive(Debug, Default)]
pub struct Report {
    pub files_scanned: usize,
    pub links_checked: usize,
    pub missing: Vec<MissingLink>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Collapses `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn target_exists(path: &Path) -> bool {
    if path.exists() {
        return true;
    }
    let mut with_html = path.as_os_str().to_owned();
    with_html.push(".html");
    PathBuf::from(with_html).exists() || path.join("index.html").exists()
}

/// Resolves `href` found in `from` against the site rooted at `root`.
/// Returns the expected target path when nothing exists there.
pub fn resolve(root: &Path, from: &Path, href: &str) -> Option<PathBuf> {
    let target = local_target(href)?;
    let absolute = match target.strip_prefix('/') {
        Some(site_relative) => root.join(site_relative.trim_start_matches('/')),
        None => from.parent().unwrap_or(root).join(target),
    };
    let absolute = normalize(&absolute);
    if target_exists(&absolute) {
        None
    } else {
        Some(absolute)
    }
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
}

fn is_page(entry: &DirEntry, extensions: &[String]) -> bool {
    let Some(extension) = entry.path().extension().and_then(|e| e.to_str()) else {
        return false;
    };
    entry.file_type().is_file()
        && extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
}

fn absolute_root(root: &Path) -> Result<PathBuf> {
    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir().map_err(LinkCheckError::CurrentDir)?.join(root)
    };
    Ok(normalize(&root))
}

/// Scans every page under the root and collects links to missing local targets.
pub fn scan(options: &ScanOptions) -> Result<Report> {
    let root = absolute_root(&options.root)?;
    if !root.is_dir() {
        return Err(LinkCheckError::MissingRoot(root));
    }
    info!(root = %root.display(), "scanning site");

    let mut report = Report::default();
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || entry
                    .file_name()
                    .to_str()
                    .map(|name| !options.skip_dirs.iter().any(|skip| skip == name))
                    .unwrap_or(true)
        });

    for entry in walker {
        let entry = entry.map_err(|source| LinkCheckError::Walk {
            path: root.clone(),
            source,
        })?;
        if !is_page(&entry, &options.extensions) {
            continue;
        }
        let path = entry.path();
        let bytes = fs::read(path).map_err(|source| LinkCheckError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        report.files_scanned += 1;

        for href in extract_hrefs(&content) {
            if is_external(href) {
                continue;
            }
            report.links_checked += 1;
            if let Some(resolved) = resolve(&root, path, href) {
                debug!(from = %path.display(), href, "missing target");
                report.missing.push(MissingLink {
                    from: relative_to(&root, path),
                    href: href.to_string(),
                    resolved: relative_to(&root, &resolved),
                });
            }
        }
    }

    info!(
        files = report.files_scanned,
        links = report.links_checked,
        missing = report.missing.len(),
        "scan finished"
    );
    Ok(report)
}
