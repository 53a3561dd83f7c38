use std::sync::LazyLock;

use regex::Regex;

const MAX_ERROR_MESSAGE_LEN: usize = 256;
const MAX_PREVIEW_CHARS: usize = 200;
const PREVIEW_ELLIPSIS: &str = "...";

// Whole fence pairs: info string up to the end of the opening line, then the body.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```([^`\r\n]*)\r?\n([\s\S]*?)```").expect("fenced block pattern is valid")
});

/// Where in the model reply the JSON candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    FencedBlock,
    BraceSpan,
    RawText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCandidate<'a> {
    pub source: CandidateSource,
    pub text: &'a str,
}

pub(crate) fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// First 200 characters of `text`, with `...` appended when anything was cut.
pub fn response_preview(text: &str) -> String {
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(MAX_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}{PREVIEW_ELLIPSIS}")
    } else {
        preview
    }
}

pub(crate) fn contains_json_delimiters(text: &str) -> bool {
    text.contains('{') && text.contains('}')
}

/// Picks the JSON candidate: fenced block, then outer brace span, then the whole text.
pub fn locate_json_candidate(text: &str) -> JsonCandidate<'_> {
    if let Some(fenced) = extract_markdown_fenced_block(text) {
        return JsonCandidate {
            source: CandidateSource::FencedBlock,
            text: fenced.trim(),
        };
    }

    if let Some(span) = extract_brace_span(text) {
        return JsonCandidate {
            source: CandidateSource::BraceSpan,
            text: span.trim(),
        };
    }

    JsonCandidate {
        source: CandidateSource::RawText,
        text: text.trim(),
    }
}

/// Body of the first fence tagged exactly `json` or left untagged.
fn extract_markdown_fenced_block(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures_iter(text)
        .find(|captures| {
            let info = captures.get(1).map_or("", |tag| tag.as_str().trim());
            info.is_empty() || info == "json"
        })
        .and_then(|captures| captures.get(2))
        .map(|body| body.as_str())
}

fn extract_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then_some(&text[start..=end])
}
