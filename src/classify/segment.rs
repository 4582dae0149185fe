//! Delimiter-based segmentation of free-form model output

use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::OnceLock;

/// How a candidate span was delimited in the raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Triple-backtick fenced block
    Fenced,
    /// Inline span, single backticks or a one-line triple pair
    Inline,
    /// The whole text, used only when no delimiter pair exists at all
    Bare,
}

/// A candidate span awaiting code-likeness scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    /// Fence info string, lowercased (`html`, `py`, `dockerfile`, ...)
    pub language: Option<String>,
    pub delimiter: Delimiter,
    /// Byte range of `text` inside the raw input
    pub span: Range<usize>,
}

/// A one-line ```` ```x``` ```` pair (group 1) or a multi-line fence with an
/// optional info string (groups 2 and 3). The one-line form is tried first so
/// its closing marker never opens the next fence.
fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```([^`\n]+)```|```([A-Za-z0-9_+#.\-]*)[^\n`]*\n(.*?)```")
            .expect("Invalid fence regex")
    })
}

fn inline_regex() -> &'static Regex {
    static INLINE: OnceLock<Regex> = OnceLock::new();
    INLINE.get_or_init(|| Regex::new(r"`([^`\n]+)`").expect("Invalid inline code regex"))
}

/// Splits raw text into candidate spans, ordered by position.
///
/// Fenced blocks are located first; inline spans are only searched in the gaps
/// between fenced blocks. An opening marker without its closing partner yields
/// nothing. When the text holds no delimiter pair at all, the trimmed text is
/// returned as a single [`Delimiter::Bare`] candidate.
pub fn segment(raw: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut gaps = Vec::new();
    let mut cursor = 0;

    for caps in fence_regex().captures_iter(raw) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        gaps.push(cursor..whole.start());
        cursor = whole.end();

        if let Some(body) = caps.get(1) {
            candidates.push(Candidate {
                text: body.as_str().to_string(),
                language: None,
                delimiter: Delimiter::Inline,
                span: body.range(),
            });
            continue;
        }

        let Some(body) = caps.get(3) else {
            continue;
        };
        let language = caps
            .get(2)
            .map(|m| m.as_str().to_lowercase())
            .filter(|lang| !lang.is_empty());

        let (text, span) = strip_closing_newline(body.as_str(), body.range());
        candidates.push(Candidate {
            text: text.to_string(),
            language,
            delimiter: Delimiter::Fenced,
            span,
        });
    }
    gaps.push(cursor..raw.len());

    for gap in gaps {
        let slice = &raw[gap.clone()];
        for caps in inline_regex().captures_iter(slice) {
            let Some(body) = caps.get(1) else {
                continue;
            };
            let start = gap.start + body.start();
            candidates.push(Candidate {
                text: body.as_str().to_string(),
                language: None,
                delimiter: Delimiter::Inline,
                span: start..start + body.len(),
            });
        }
    }

    if candidates.is_empty() && !raw.contains('`') && !raw.trim().is_empty() {
        let trimmed = raw.trim();
        let start = raw.len() - raw.trim_start().len();
        candidates.push(Candidate {
            text: trimmed.to_string(),
            language: None,
            delimiter: Delimiter::Bare,
            span: start..start + trimmed.len(),
        });
    }

    candidates.sort_by_key(|c| c.span.start);
    candidates
}

fn strip_closing_newline(body: &str, span: Range<usize>) -> (&str, Range<usize>) {
    let trimmed = body
        .strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body);
    (trimmed, span.start..span.start + trimmed.len())
}
