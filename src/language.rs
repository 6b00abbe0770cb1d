use std::collections::BTreeSet;

/// Fence languages accepted without the `--languages` flag.
///
/// These mirror the grammars the highlighting pipeline loads by default:
/// the TypeScript/JavaScript family plus component files.
const DEFAULT_LANGUAGES: &[&str] = &[
    "js",
    "javascript",
    "jsx",
    "ts",
    "typescript",
    "tsx",
    "mts",
    "cts",
    "vue",
];

/// Fence languages that are routed through the type checker. Everything else
/// that is known is highlight-only and passes verification unchecked.
const TYPE_CHECKED_LANGUAGES: &[&str] = &[
    "js",
    "javascript",
    "jsx",
    "ts",
    "typescript",
    "tsx",
    "mts",
    "cts",
];

/// Registry of fence languages accepted in annotated code blocks.
///
/// A block in an unknown language is a verification failure (the rendering
/// layer has no grammar for it); additional languages can be registered from
/// a comma-separated list, mirroring the CLI's `--languages` option.
///
/// # Example
///
/// ```
/// use twoslash_verify::language::LanguageRegistry;
///
/// let mut registry = LanguageRegistry::with_defaults();
/// registry.extend_from_list("python, rust");
/// assert!(registry.contains("ts"));
/// assert!(registry.contains("rust"));
/// assert!(!registry.contains("haskell"));
/// ```
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    known: BTreeSet<String>,
}

impl LanguageRegistry {
    /// Create a registry containing the default language set.
    pub fn with_defaults() -> Self {
        Self {
            known: DEFAULT_LANGUAGES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Register additional languages from a comma-separated list.
    /// Blank entries are ignored.
    pub fn extend_from_list(&mut self, list: &str) {
        for entry in list.split(',') {
            let entry = entry.trim();
            if !entry.is_empty() {
                self.known.insert(entry.to_string());
            }
        }
    }

    pub fn contains(&self, language: &str) -> bool {
        self.known.contains(language)
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Whether blocks in this fence language are handed to the type checker.
pub fn is_type_checked(language: &str) -> bool {
    TYPE_CHECKED_LANGUAGES.contains(&language)
}

/// File name for the virtual source file a sample is checked as.
///
/// Component-syntax languages get the `.tsx` variant so JSX survives the
/// `jsx: preserve` baseline; everything else is checked as a bare script.
pub fn sample_file_name(language: &str) -> &'static str {
    match language {
        "tsx" | "jsx" => "index.tsx",
        _ => "index.ts",
    }
}
