use crate::checker::{OptionsMerger, SampleChecker, TscChecker};
use crate::config::load_config_set;
use crate::declarations::{collect_type_declarations, BUILD_DIR_NAME};
use crate::extractor::{self, extract_samples, CodeSample};
use crate::language::LanguageRegistry;
use crate::reporting;
use anyhow::{Context as _, Result};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory entries never descended into during document discovery.
const SKIPPED_DIRS: [&str; 2] = ["node_modules", "dist"];

/// Options for a verification run.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Project root directory.
    pub root_dir: PathBuf,
    /// Build output directory holding generated configs and declarations.
    /// Defaults to `<root>/.nuxt`.
    pub build_dir: Option<PathBuf>,
    /// Directory scanned for markdown documents. Defaults to
    /// `<root>/content`.
    pub content_dir: Option<PathBuf>,
    /// Comma-separated additional fence languages, accepted highlight-only.
    pub languages: Option<String>,
    /// Read project configuration and type declarations from the build
    /// directory before checking.
    pub resolve_project: bool,
    /// Keep running, re-verifying changed files, until cancelled.
    pub watch: bool,
    /// TypeScript compiler executable. Defaults to `tsc` from `PATH`.
    pub compiler: Option<String>,
    /// Run-level compiler option overrides, applied over the per-context
    /// options for every sample (embedding surface; not exposed on the
    /// CLI).
    pub compiler_options: Map<String, Value>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            build_dir: None,
            content_dir: None,
            languages: None,
            resolve_project: true,
            watch: false,
            compiler: None,
            compiler_options: Map::new(),
        }
    }
}

/// One recorded verification failure. `error` is the opaque payload raised
/// by the checking capability, attributed to the sample that triggered it.
#[derive(Debug, Clone)]
pub struct VerificationError {
    pub file: PathBuf,
    pub line: usize,
    pub error: String,
}

/// Counters for one verification run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Documents read.
    pub files_scanned: usize,
    /// Documents that survived the trigger short-circuit and were parsed.
    pub files_parsed: usize,
    /// Samples handed to the checker.
    pub blocks_checked: usize,
}

/// Accumulates errors and statistics over a verification run.
///
/// The error list is append-only while a run is in flight and truncated
/// only at run boundaries (the start of a full run, or the start of
/// reprocessing one changed file in watch mode). Passing the session
/// explicitly through every operation keeps verification reentrant: there
/// is no module-level mutable state to race on.
#[derive(Debug, Default)]
pub struct VerificationSession {
    errors: Vec<VerificationError>,
    stats: RunStats,
}

impl VerificationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[VerificationError] {
        &self.errors
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Truncate accumulated errors and counters. Called only at run
    /// boundaries.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.stats = RunStats::default();
    }

    fn record(&mut self, sample: &CodeSample, error: anyhow::Error) {
        self.errors.push(VerificationError {
            file: sample.source_file.clone(),
            line: sample.line,
            error: format!("{error:#}"),
        });
    }
}

/// Run a full verification pass, and optionally keep watching.
///
/// Returns the number of errors accumulated by the initial pass. The
/// process is never exited from here, so embedded callers keep control of
/// their own exit status.
pub async fn verify(options: &VerifyOptions) -> Result<usize> {
    let build_dir = options
        .build_dir
        .clone()
        .unwrap_or_else(|| options.root_dir.join(BUILD_DIR_NAME));
    let content_dir = options
        .content_dir
        .clone()
        .unwrap_or_else(|| options.root_dir.join("content"));

    let (configs, declarations) = if options.resolve_project {
        println!("Resolving project types in {}...", build_dir.display());
        let configs = load_config_set(&build_dir).await;
        let declarations = collect_type_declarations(&build_dir).await?;
        (Some(configs), Some(declarations))
    } else {
        (None, None)
    };

    let merger = OptionsMerger::new(configs, options.compiler_options.clone());
    let mut languages = LanguageRegistry::with_defaults();
    if let Some(list) = &options.languages {
        languages.extend_from_list(list);
    }
    let mut checker = TscChecker::new(merger, declarations).with_languages(languages);
    if let Some(compiler) = &options.compiler {
        checker = checker.with_compiler(compiler)?;
    }

    let files = discover_documents(&content_dir)?;
    log::debug!(
        "Discovered {} documents under {}",
        files.len(),
        content_dir.display()
    );
    println!("Verifying twoslash in {} files...", files.len());
    for file in &files {
        println!("  - {}", file.display());
    }
    println!();

    let mut session = VerificationSession::new();
    for file in &files {
        verify_document(&mut session, &checker, file).await?;
    }
    println!();
    reporting::report_run(session.errors(), session.stats());
    let error_count = session.errors().len();

    if options.watch {
        watch_loop(&content_dir, &files, &mut session, &checker).await?;
    }

    Ok(error_count)
}

/// Enumerate candidate markdown documents under the content root.
///
/// Recursive, skipping dot-entries and dependency/output directories;
/// symlinked directories are not followed. The result is sorted so errors
/// are reported in a stable order. An unreadable content root is fatal;
/// without a file list there is no meaningful partial progress.
pub fn discover_documents(content_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_documents(content_dir, &mut files)
        .with_context(|| format!("Failed to scan content directory {}", content_dir.display()))?;
    files.sort();
    Ok(files)
}

fn walk_documents(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || SKIPPED_DIRS.contains(&name) {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_documents(&path, files)?;
        } else if file_type.is_file() && name.ends_with(".md") {
            files.push(path);
        }
    }
    Ok(())
}

/// Verify all in-scope samples of one document, strictly in source order.
///
/// A document whose content never mentions the trigger keyword is skipped
/// before any parsing. Checker failures are recorded against the sample
/// that raised them and never abort sibling samples or sibling files.
pub async fn verify_document<C: SampleChecker>(
    session: &mut VerificationSession,
    checker: &C,
    path: &Path,
) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    session.stats.files_scanned += 1;

    if !extractor::content_mentions_trigger(&content) {
        return Ok(());
    }
    session.stats.files_parsed += 1;

    let samples = extract_samples(&content, path);
    println!(
        "Verifying {} ({} twoslash code blocks)",
        path.display(),
        samples.len()
    );

    for sample in samples {
        session.stats.blocks_checked += 1;
        if let Err(error) = checker.check(&sample).await {
            session.record(&sample, error);
        }
    }

    Ok(())
}

/// Re-verify discovered documents as they change, until cancelled.
///
/// Each change event triggers a fresh sequential run scoped to the changed
/// file: the session is truncated, the one file is re-verified with the
/// already-constructed checker, and a new report is printed.
async fn watch_loop<C: SampleChecker>(
    content_dir: &Path,
    files: &[PathBuf],
    session: &mut VerificationSession,
    checker: &C,
) -> Result<()> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let mut watched: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    for file in files {
        if let Ok(canonical) = file.canonicalize() {
            watched.insert(canonical, file.clone());
        }
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(
        move |result: Result<notify::Event, notify::Error>| {
            if let Ok(event) = result {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            }
        },
    )
    .context("Failed to create file watcher")?;
    watcher
        .watch(content_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", content_dir.display()))?;

    println!("Watching for changes... (press Ctrl+C to stop)");

    loop {
        let first = rx.recv().context("File watcher channel closed")?;
        let mut changed = BTreeSet::from([first]);
        // Debounce: drain additional events within 200ms.
        while let Ok(path) = rx.recv_timeout(Duration::from_millis(200)) {
            changed.insert(path);
        }

        for path in changed {
            let Ok(canonical) = path.canonicalize() else {
                continue;
            };
            let Some(file) = watched.get(&canonical) else {
                continue;
            };
            let file = file.clone();

            println!("\nFile change detected: {}", file.display());
            session.reset();
            verify_document(session, checker, &file).await?;
            reporting::report_run(session.errors(), session.stats());
        }
    }
}
