//! Rendering of `version_format` templates such as `{current_date}.{build_count:03}`.
//!
//! The template language is the small subset of brace formatting the
//! configuration files use: `{name}` or `{name:spec}` where `spec` is an
//! optional `0` fill flag, an optional width and an optional type letter
//! (`d` for the build count, `s` for the date). `{{` and `}}` are literal
//! braces.

use crate::error::{BumpCalverError, Result};

/// Placeholder for the formatted current date.
pub const CURRENT_DATE: &str = "current_date";

/// Placeholder for the same-day build counter.
pub const BUILD_COUNT: &str = "build_count";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FormatSpec {
    zero_fill: bool,
    width: usize,
    kind: Option<char>,
}

impl FormatSpec {
    fn parse(spec: &str) -> Option<Self> {
        let mut rest = spec;
        let mut parsed = FormatSpec::default();

        if let Some(kind) = rest.chars().last().filter(|c| c.is_ascii_alphabetic()) {
            parsed.kind = Some(kind);
            rest = &rest[..rest.len() - 1];
        }

        if let Some(stripped) = rest.strip_prefix('0') {
            parsed.zero_fill = true;
            rest = stripped;
        }

        if !rest.is_empty() {
            if !rest.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            parsed.width = rest.parse().ok()?;
        }

        Some(parsed)
    }

    fn pad(&self, value: &str, numeric: bool) -> String {
        let len = value.chars().count();
        if len >= self.width {
            return value.to_string();
        }

        let fill = if self.zero_fill { '0' } else { ' ' };
        let padding: String = std::iter::repeat(fill).take(self.width - len).collect();

        if numeric {
            format!("{}{}", padding, value)
        } else {
            format!("{}{}", value, padding)
        }
    }
}

/// Returns true if the template references the given placeholder, with or without a spec.
pub fn has_placeholder(template: &str, name: &str) -> bool {
    template.contains(&format!("{{{}}}", name)) || template.contains(&format!("{{{}:", name))
}

/// Renders a version template with the current date and build count.
///
/// # Returns
/// * `Ok(String)` - The rendered version
/// * `Err` - If the template names an unknown placeholder, has an invalid
///   format spec, or contains unbalanced braces
///
/// # Example
/// ```
/// use bumpcalver::version::template::render_version;
///
/// let version = render_version("{current_date}.{build_count:03}", "25.Q4", 7).unwrap();
/// assert_eq!(version, "25.Q4.007");
/// ```
pub fn render_version(template: &str, current_date: &str, build_count: u32) -> Result<String> {
    let mut output = String::with_capacity(template.len() + current_date.len());
    let mut chars = template.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                output.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                output.push('}');
            }
            '{' => {
                let close = template[index..].find('}').ok_or_else(|| {
                    BumpCalverError::template(format!(
                        "Single '{{' encountered in version format '{}'",
                        template
                    ))
                })?;
                let field = &template[index + 1..index + close];
                output.push_str(&render_field(template, field, current_date, build_count)?);

                while let Some((next_index, _)) = chars.peek() {
                    if *next_index > index + close {
                        break;
                    }
                    chars.next();
                }
            }
            '}' => {
                return Err(BumpCalverError::template(format!(
                    "Single '}}' encountered in version format '{}'",
                    template
                )));
            }
            other => output.push(other),
        }
    }

    Ok(output)
}

fn render_field(template: &str, field: &str, current_date: &str, build_count: u32) -> Result<String> {
    let (name, spec) = match field.split_once(':') {
        Some((name, spec)) => (name, spec),
        None => (field, ""),
    };

    let spec = FormatSpec::parse(spec).ok_or_else(|| {
        BumpCalverError::template(format!(
            "Invalid format specifier '{}' for '{}' in '{}'",
            spec, name, template
        ))
    })?;

    match name {
        CURRENT_DATE => match spec.kind {
            None | Some('s') => Ok(spec.pad(current_date, false)),
            Some(kind) => Err(BumpCalverError::template(format!(
                "Unknown format code '{}' for the current date",
                kind
            ))),
        },
        BUILD_COUNT => match spec.kind {
            None | Some('d') => Ok(spec.pad(&build_count.to_string(), true)),
            Some(kind) => Err(BumpCalverError::template(format!(
                "Unknown format code '{}' for the build count",
                kind
            ))),
        },
        other => Err(BumpCalverError::template(format!(
            "Unknown placeholder '{{{}}}' in version format '{}'",
            other, template
        ))),
    }
}
