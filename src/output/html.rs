//! index.html patching

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::project::Flavor;

/// Vue CLI / html-webpack-plugin template variable for the public path
static BASE_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<%=\s*BASE_URL\s*%>").unwrap());

static BODY_CLOSE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</body\s*>").unwrap());

/// HTML template to start from, if the project has one
pub fn html_source(root: &Path, flavor: Flavor) -> Option<PathBuf> {
    let candidates: &[&str] = if flavor.is_react() || flavor.is_vue() {
        &["public/index.html", "index.html"]
    } else {
        &["index.html", "public/index.html"]
    };

    candidates.iter().map(|c| root.join(c)).find(|p| p.is_file())
}

/// Point an HTML page at `entry` as a module script.
///
/// Template placeholders for the public path are dropped and any previous
/// script tag for the same entry is removed, so patching twice is harmless.
pub fn patch_html(html: &str, entry: &str) -> String {
    let html = html.replace("%PUBLIC_URL%", "");
    let html = BASE_URL_REGEX.replace_all(&html, "/").into_owned();

    let existing = Regex::new(&format!(
        r#"\s*<script[^>]*src=["']{}["'][^>]*>\s*</script>"#,
        regex::escape(entry)
    ));
    let html = match existing {
        Ok(re) => re.replace_all(&html, "").into_owned(),
        Err(_) => html,
    };

    let tag = format!("<script type=\"module\" src=\"{}\"></script>", entry);
    match BODY_CLOSE_REGEX.find(&html) {
        Some(close) => {
            let (before, after) = html.split_at(close.start());
            let indent_len = before.len() - before.trim_end_matches([' ', '\t']).len();
            let indent = &before[before.len() - indent_len..];
            format!("{}{}\n{}{}", before, tag, indent, after)
        }
        None => format!("{}\n{}\n", html.trim_end(), tag),
    }
}
