use crate::config::ConfigSet;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// The logical project area governing which compiler configuration applies
/// to a code sample. `Default` is the fallback when nothing more specific
/// can be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    App,
    Node,
    Server,
    Shared,
    Default,
}

impl Context {
    /// Priority order for filename-based inference. Server-side patterns are
    /// tested before the broader app-level ones; with overlapping patterns
    /// (e.g. `server/utils/helper.ts` matching both `server/**/*` and a
    /// catch-all app include) the earlier slot wins. This order is part of
    /// the observable contract; do not reorder by pattern specificity.
    pub const INFERENCE_ORDER: [Context; 4] =
        [Context::Server, Context::Node, Context::App, Context::Shared];

    pub fn as_str(&self) -> &'static str {
        match self {
            Context::App => "app",
            Context::Node => "node",
            Context::Server => "server",
            Context::Shared => "shared",
            Context::Default => "default",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn explicit_context_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bcontext:(app|node|server|shared)\b").expect("valid pattern")
    })
}

fn bracketed_filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]").expect("valid pattern"))
}

/// Decide which context governs a sample, from its fence metadata and the
/// discovered configuration set.
///
/// Selection is pure and total: the same inputs always produce the same
/// context, and a context is always produced. In strict priority order:
///
/// 1. no metadata → `Default`;
/// 2. an explicit `context:<slot>` token wins outright, even when a
///    bracketed filename would suggest a different area;
/// 3. a `[filename]` in the metadata is tested against each loaded slot's
///    include/exclude patterns in [`Context::INFERENCE_ORDER`];
/// 4. otherwise → `Default`.
///
/// # Example
///
/// ```
/// use twoslash_verify::context::{detect_context, Context};
///
/// assert_eq!(detect_context(Some("ts twoslash context:server"), None), Context::Server);
/// assert_eq!(detect_context(None, None), Context::Default);
/// ```
pub fn detect_context(meta: Option<&str>, configs: Option<&ConfigSet>) -> Context {
    let Some(meta) = meta else {
        return Context::Default;
    };

    if let Some(captures) = explicit_context_re().captures(meta) {
        return match &captures[1] {
            "app" => Context::App,
            "node" => Context::Node,
            "server" => Context::Server,
            _ => Context::Shared,
        };
    }

    let Some(captures) = bracketed_filename_re().captures(meta) else {
        return Context::Default;
    };
    let Some(configs) = configs else {
        return Context::Default;
    };
    let filename = &captures[1];

    for context in Context::INFERENCE_ORDER {
        if let Some(entry) = configs.entry(context) {
            if matches_glob_patterns(
                filename,
                entry.include.as_deref(),
                entry.exclude.as_deref(),
            ) {
                return context;
            }
        }
    }

    Context::Default
}

/// A filename matches when it matches at least one include pattern and no
/// exclude pattern. No include patterns means no match.
fn matches_glob_patterns(
    filename: &str,
    include: Option<&[String]>,
    exclude: Option<&[String]>,
) -> bool {
    let Some(include) = include.filter(|patterns| !patterns.is_empty()) else {
        return false;
    };

    if !build_glob_set(include).is_match(filename) {
        return false;
    }

    match exclude.filter(|patterns| !patterns.is_empty()) {
        Some(exclude) => !build_glob_set(exclude).is_match(filename),
        None => true,
    }
}

/// Build a `GlobSet` with the same semantics as the configuration files'
/// own include/exclude mechanism: `*` stops at path separators, `**` spans
/// them, and dotfiles are matched. Invalid patterns are skipped.
fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = GlobBuilder::new(pattern).literal_separator(true).build() {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}
