use std::{collections::HashSet, path::Path, sync::LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;

pub const LIST_FILE_EXTENSION: &str = ".txt";

static FORBIDDEN_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/:*?"><|]"#).expect("valid sanitize regex"));

pub fn is_list_file(entry: &str) -> bool {
    entry.to_lowercase().ends_with(LIST_FILE_EXTENSION)
}

/// Reads a list file, one entry per line. Blank lines are dropped.
pub async fn read_list_file(path: &Path) -> std::io::Result<Vec<String>> {
    let content = async_fs::read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Expands list files in place and removes duplicates.
///
/// Entries of a list file are taken as plain references even if they look
/// like list files themselves. Comparison is case-insensitive and the first
/// occurrence wins. List-file paths are tracked apart from references, so a
/// repeated list file is expanded once.
pub async fn process_urls(entries: &[String]) -> std::io::Result<Vec<String>> {
    let mut processed: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut list_paths: HashSet<String> = HashSet::new();

    let mut push = |entry: String, processed: &mut Vec<String>| {
        if seen.insert(entry.to_lowercase()) {
            processed.push(entry);
        }
    };

    for entry in entries {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        if is_list_file(entry) {
            if !list_paths.insert(entry.to_lowercase()) {
                continue;
            }
            for line in read_list_file(Path::new(entry)).await? {
                push(line, &mut processed);
            }
        } else {
            push(entry.to_string(), &mut processed);
        }
    }

    Ok(processed)
}

/// Replaces characters that are forbidden in file names with `_`.
pub fn sanitize(name: &str) -> String {
    FORBIDDEN_CHARS.replace_all(name, "_").into_owned()
}

/// Returns the first `max_chars` characters and whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (text[..idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Cover and booklet URLs come without scheme.
pub fn absolute_url(url: &str) -> String {
    if url.starts_with("https://") || url.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

/// An album is available from its timestamp on, with second precision.
pub fn is_available(available_from: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match available_from {
        Some(at) => now.timestamp() >= at.timestamp(),
        None => true,
    }
}
