use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// The metadata token marking a fenced code block as subject to
/// verification. Matched as a standalone token, so e.g. `twoslashes` in a
/// fence info string does not opt a block in.
pub const TRIGGER_KEYWORD: &str = "twoslash";

/// One annotated code block extracted from a markdown document.
///
/// Samples are identified by fenced code syntax whose info string carries
/// the trigger keyword after the language:
///
/// ````markdown
/// ```ts twoslash [server/api/hello.ts]
/// export default defineEventHandler(() => 'hello')
/// ```
/// ````
///
/// `language` is the first token of the info string; `raw_meta` is
/// everything after it and feeds context detection. `line` is the
/// 1-indexed line of the opening fence, used for error attribution.
#[derive(Debug, Clone)]
pub struct CodeSample {
    pub content: String,
    pub language: String,
    pub source_file: PathBuf,
    pub line: usize,
    pub raw_meta: String,
}

fn trigger_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\btwoslash\b").expect("valid pattern"))
}

/// Whether fence metadata opts a block in, i.e. contains the trigger
/// keyword as a standalone token.
pub fn has_trigger(meta: &str) -> bool {
    trigger_re().is_match(meta)
}

/// Cheap pre-parse check: can this document contain any in-scope block at
/// all? Plain substring containment; the per-block check is the strict one.
pub fn content_mentions_trigger(content: &str) -> bool {
    content.contains(TRIGGER_KEYWORD)
}

/// Extract all in-scope code samples from a markdown document, in source
/// order.
pub fn extract_samples(content: &str, source_file: &Path) -> Vec<CodeSample> {
    let mut samples = Vec::new();
    let mut in_sample = false;
    let mut current_code = String::new();
    let mut current_language = String::new();
    let mut current_meta = String::new();
    let mut current_line = 0;

    for (event, range) in Parser::new(content).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let (language, meta) = split_fence_info(info.as_ref());
                if has_trigger(&meta) {
                    in_sample = true;
                    current_code.clear();
                    current_language = language;
                    current_meta = meta;
                    current_line = line_of_offset(content, range.start);
                }
            }

            Event::End(TagEnd::CodeBlock) => {
                if in_sample {
                    samples.push(CodeSample {
                        content: current_code.clone(),
                        language: current_language.clone(),
                        source_file: source_file.to_path_buf(),
                        line: current_line,
                        raw_meta: current_meta.clone(),
                    });
                    in_sample = false;
                }
            }

            Event::Text(text) => {
                if in_sample {
                    current_code.push_str(&text);
                }
            }

            _ => {}
        }
    }

    samples
}

/// Split a fence info string into the language (first token) and the
/// remaining metadata.
fn split_fence_info(info: &str) -> (String, String) {
    let info = info.trim();
    match info.split_once(char::is_whitespace) {
        Some((language, meta)) => (language.to_string(), meta.trim_start().to_string()),
        None => (info.to_string(), String::new()),
    }
}

/// 1-indexed line number of a byte offset.
fn line_of_offset(content: &str, offset: usize) -> usize {
    content[..offset.min(content.len())]
        .bytes()
        .filter(|b| *b == b'\n')
        .count()
        + 1
}
