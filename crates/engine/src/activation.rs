//! URL patterns of the pages the helper runs on.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

/// Match patterns in userscript `@match` syntax.
pub const MATCH_PATTERNS: &[&str] = &[
    "*://www.bilibili.com/video/*",
    "*://www.bilibili.com/bangumi/play/*",
    "*://www.bilibili.com/blackboard/*",
    "*://www.bilibili.com/watchlater/*",
    "*://player.bilibili.com/*",
];

/// Compiled [`MATCH_PATTERNS`].
static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();

/// Translate one match pattern: a `*` scheme means http or https, any other
/// `*` matches any run of characters.
fn pattern_to_regex(pattern: &str) -> String {
    let (scheme, rest) = match pattern.strip_prefix("*://") {
        Some(rest) => ("https?://", rest),
        None => ("", pattern),
    };
    let body: Vec<String> = rest.split('*').map(regex::escape).collect();
    format!("^{scheme}{}$", body.join(".*"))
}

/// Compiled patterns, built on first use.
fn compiled() -> &'static [Regex] {
    COMPILED.get_or_init(|| {
        MATCH_PATTERNS
            .iter()
            .filter_map(|p| match Regex::new(&pattern_to_regex(p)) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = p, error = %e, "bad match pattern");
                    None
                }
            })
            .collect()
    })
}

/// True when the helper should activate on `url`.
pub fn should_activate(url: &str) -> bool {
    compiled().iter().any(|re| re.is_match(url))
}
