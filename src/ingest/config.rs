// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_BLOCKLIST_PATH: &str = "INGEST_BLOCKLIST_PATH";

/// Title keywords blocked when no blocklist file is configured.
pub const DEFAULT_BLOCKED_KEYWORDS: &[&str] = &[
    "google",
    "facebook",
    "meta",
    "twitter",
    "reddit",
    "instagram",
    "youtube",
    "linkedin",
    "pinterest",
    "amazon",
    "microsoft",
    "apple",
    "netflix",
    "spotify",
    "quora",
    "bitcoin",
    "military",
    "politics",
    "american",
    "United States",
];

/// Candidate files tried in order when `$INGEST_BLOCKLIST_PATH` is unset.
const FALLBACK_FILES: &[&str] = &["config/blocked_keywords.toml", "config/blocked_keywords.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlocklistFormat {
    /// `keywords = ["..", ..]`
    Toml,
    /// `["..", ..]`
    Json,
}

impl BlocklistFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(anyhow!(
                "blocklist {} must end in .toml or .json",
                path.display()
            )),
        }
    }

    fn parse(self, content: &str) -> Result<Vec<String>> {
        #[derive(serde::Deserialize)]
        struct KeywordsTable {
            keywords: Vec<String>,
        }
        let raw = match self {
            Self::Toml => toml::from_str::<KeywordsTable>(content)?.keywords,
            Self::Json => serde_json::from_str::<Vec<String>>(content)?,
        };
        Ok(normalize_keywords(raw))
    }
}

/// Load the blocklist from an explicit path; the extension picks the format.
pub fn load_blocklist_from(path: &Path) -> Result<Vec<String>> {
    let format = BlocklistFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading blocklist from {}", path.display()))?;
    format
        .parse(&content)
        .with_context(|| format!("parsing blocklist {}", path.display()))
}

/// `$INGEST_BLOCKLIST_PATH` if set (it must exist), else the first of
/// [`FALLBACK_FILES`] that exists, else [`DEFAULT_BLOCKED_KEYWORDS`].
pub fn load_blocklist_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_BLOCKLIST_PATH) {
        let path = PathBuf::from(p);
        if !path.exists() {
            return Err(anyhow!("{ENV_BLOCKLIST_PATH} points to non-existent path"));
        }
        return load_blocklist_from(&path);
    }
    match FALLBACK_FILES.iter().map(Path::new).find(|p| p.exists()) {
        Some(path) => load_blocklist_from(path),
        None => Ok(normalize_keywords(DEFAULT_BLOCKED_KEYWORDS.iter().copied())),
    }
}

/// Trim, lower-case, drop blanks and duplicates. Titles are compared in
/// lower case, so case variants of one keyword collapse to a single entry.
fn normalize_keywords<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = items
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
