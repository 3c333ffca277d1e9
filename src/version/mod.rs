//! Calendar version engine: date formatting, template rendering, parsing,
//! normalization and next-version resolution.

pub mod clock;
pub mod formatter;
pub mod parser;
pub mod resolver;
pub mod template;

pub use clock::{current_date, format_date};
pub use formatter::format_version;
pub use parser::{parse_version, ParseOutcome, ParsedVersion};
pub use resolver::{get_build_version, PriorVersion};
pub use template::render_version;
