//! Splits frontend fragments into markup, stylesheet and script files

use super::category::ArtifactCategory;
use super::model::{join_fragments, Artifact, Fragment};
use regex::Regex;
use std::sync::OnceLock;

pub const MARKUP_FILE: &str = "index.html";
pub const STYLE_FILE: &str = "style.css";
pub const SCRIPT_FILE: &str = "script.js";

fn document_regex() -> &'static Regex {
    static DOCUMENT: OnceLock<Regex> = OnceLock::new();
    DOCUMENT.get_or_init(|| {
        Regex::new(r"(?is)(?:<!DOCTYPE\s+html[^>]*>\s*)?<html\b.*?</html\s*>")
            .expect("Invalid html document regex")
    })
}

fn style_tag_regex() -> &'static Regex {
    static STYLE: OnceLock<Regex> = OnceLock::new();
    STYLE.get_or_init(|| {
        Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").expect("Invalid style tag regex")
    })
}

fn script_tag_regex() -> &'static Regex {
    static SCRIPT: OnceLock<Regex> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("Invalid script tag regex")
    })
}

fn stylesheet_regex() -> &'static Regex {
    static RULE: OnceLock<Regex> = OnceLock::new();
    RULE.get_or_init(|| {
        Regex::new(r"(?m)^\s*[@.#a-zA-Z*:\[][^{};=()]*\{[^{}]*:[^{}]*\}")
            .expect("Invalid stylesheet regex")
    })
}

#[derive(Default)]
struct Split {
    markup: Vec<String>,
    styles: Vec<String>,
    scripts: Vec<String>,
}

impl Split {
    fn is_empty(&self) -> bool {
        self.markup.is_empty() && self.styles.is_empty() && self.scripts.is_empty()
    }
}

fn is_markup_hint(language: Option<&str>) -> bool {
    matches!(language, Some("html") | Some("htm") | Some("xhtml"))
}

/// True for a delimited block holding a whole page
fn is_document(fragment: &Fragment) -> bool {
    !fragment.inline
        && (is_markup_hint(fragment.language.as_deref()) || document_regex().is_match(&fragment.text))
}

/// Builds up to three frontend files from the category's fragments.
///
/// Fence hints are honoured first, then html documents and standalone
/// `<style>`/`<script>` elements. If nothing can be split the joined text
/// becomes the markup file. Inline spans are prose mentions once a full
/// document exists and are left out.
pub fn split_frontend(fragments: &[Fragment]) -> Vec<Artifact> {
    let has_document = fragments.iter().any(is_document);
    let kept: Vec<Fragment> = fragments
        .iter()
        .filter(|f| !(has_document && f.inline))
        .cloned()
        .collect();

    let mut split = Split::default();
    let mut leftovers = Vec::new();

    for fragment in &kept {
        match fragment.language.as_deref() {
            lang if is_markup_hint(lang) => split.markup.push(fragment.text.clone()),
            Some("css") | Some("scss") => split.styles.push(fragment.text.clone()),
            Some("js") | Some("javascript") | Some("jsx") | Some("mjs") => {
                split.scripts.push(fragment.text.clone())
            }
            _ => {
                if let Some(rest) = split_by_tags(&fragment.text, &mut split) {
                    leftovers.push(rest);
                }
            }
        }
    }

    if split.is_empty() {
        let whole = join_fragments(&kept);
        if whole.trim().is_empty() {
            return Vec::new();
        }
        return vec![Artifact::new(ArtifactCategory::Frontend, MARKUP_FILE, whole)];
    }

    for rest in leftovers {
        if rest.trim_start().starts_with('<') {
            split.markup.push(rest);
        } else if stylesheet_regex().is_match(&rest) {
            split.styles.push(rest);
        } else {
            split.scripts.push(rest);
        }
    }

    let mut artifacts = Vec::new();
    for (filename, parts) in [
        (MARKUP_FILE, split.markup),
        (STYLE_FILE, split.styles),
        (SCRIPT_FILE, split.scripts),
    ] {
        if !parts.is_empty() {
            artifacts.push(Artifact::new(
                ArtifactCategory::Frontend,
                filename,
                parts.join("\n\n"),
            ));
        }
    }
    artifacts
}

/// Pulls documents and tag bodies out of `text`; returns what remains
fn split_by_tags(text: &str, split: &mut Split) -> Option<String> {
    let mut rest = String::new();
    let mut cursor = 0;
    for doc in document_regex().find_iter(text) {
        split.markup.push(doc.as_str().to_string());
        rest.push_str(&text[cursor..doc.start()]);
        cursor = doc.end();
    }
    rest.push_str(&text[cursor..]);

    let rest = extract_tag_bodies(&rest, style_tag_regex(), &mut split.styles);
    let rest = extract_tag_bodies(&rest, script_tag_regex(), &mut split.scripts);

    let trimmed = rest.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn extract_tag_bodies(text: &str, tag: &Regex, into: &mut Vec<String>) -> String {
    for caps in tag.captures_iter(text) {
        if let Some(body) = caps.get(1) {
            let body = body.as_str().trim();
            if !body.is_empty() {
                into.push(body.to_string());
            }
        }
    }
    tag.replace_all(text, "").into_owned()
}
