use regex::Regex;

/// Name of the PEP 440 style normalization standard.
pub const PYTHON_STANDARD: &str = "python";

/// Formats a version string according to a versioning standard.
///
/// Only `"python"` is recognized; any other standard returns the version unchanged.
pub fn format_version(version: &str, standard: &str) -> String {
    match standard {
        PYTHON_STANDARD => format_pep440_version(version),
        _ => version.to_string(),
    }
}

/// Normalizes a version towards PEP 440.
///
/// Hyphens and underscores become dots, and leading zeros are dropped from
/// numeric segments (`2024-01-05-007` becomes `2024.1.5.7`).
pub fn format_pep440_version(version: &str) -> String {
    let dotted = version.replace(['-', '_'], ".");

    match Regex::new(r"\b0+([0-9])") {
        Ok(re) => re.replace_all(&dotted, "$1").into_owned(),
        Err(_) => dotted,
    }
}
