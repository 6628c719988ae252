//! Download filename extraction from `Content-Disposition`.

use std::sync::LazyLock;

use regex::Regex;

// `filename*=UTF-8''report%202024.xlsx`
static EXTENDED_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)filename\*\s*=\s*(?:[\w-]+)?'[^']*'([^;\s]+)"#).unwrap());

// `filename="report 2024.xlsx"` or `filename=report.xlsx`
static FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^;]+))"#).unwrap());

/// Filename announced by a `Content-Disposition` header value.
///
/// The extended `filename*` form wins over plain `filename`. Directory
/// components are dropped. Returns `None` when no usable name is present.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let extended = EXTENDED_FILENAME
        .captures(header)
        .and_then(|c| c.get(1))
        .and_then(|m| urlencoding::decode(m.as_str()).ok())
        .map(|name| name.into_owned());

    let name = extended.or_else(|| {
        let caps = FILENAME.captures(header)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim().to_string())
    })?;

    let name = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    // Empty, `.`, `..` and other all-dot names would resolve to a directory.
    if name.chars().all(|c| c == '.') {
        None
    } else {
        Some(name.to_string())
    }
}

/// Filename for a download: the header's name, or `default` when the header
/// is absent or malformed.
pub fn download_filename(header: Option<&str>, default: &str) -> String {
    header
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| default.to_string())
}
