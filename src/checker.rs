use crate::config::ConfigSet;
use crate::context::{detect_context, Context};
use crate::extractor::CodeSample;
use crate::language::{self, LanguageRegistry};
use crate::options::{compiler_options_for_context, merge_ordered};
use crate::prologue::build_prologue;
use anyhow::{Context as _, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use tempfile::TempDir;
use tokio::process::Command;

/// Resolves the effective compiler options for a sample.
///
/// Owns the discovered configuration set and the run-level user overrides;
/// the checker consults it per invocation instead of reading any shared
/// state. Precedence, lowest first: fixed baseline, per-context options,
/// run-level user overrides, per-invocation overrides.
#[derive(Debug, Clone, Default)]
pub struct OptionsMerger {
    configs: Option<ConfigSet>,
    user_options: Map<String, Value>,
}

impl OptionsMerger {
    pub fn new(configs: Option<ConfigSet>, user_options: Map<String, Value>) -> Self {
        Self {
            configs,
            user_options,
        }
    }

    /// Decide which context governs a sample's metadata.
    pub fn detect(&self, meta: Option<&str>) -> Context {
        detect_context(meta, self.configs.as_ref())
    }

    /// Flatten the option chain for a context.
    pub fn resolve(
        &self,
        context: Context,
        invocation_options: Option<&Map<String, Value>>,
    ) -> Map<String, Value> {
        let baseline = baseline_options();
        let contextual = compiler_options_for_context(self.configs.as_ref(), context);

        let mut sources = vec![&baseline, &contextual, &self.user_options];
        if let Some(invocation_options) = invocation_options {
            sources.push(invocation_options);
        }
        merge_ordered(sources)
    }
}

/// Options every check starts from: browser-grade libs, JSX preserved for
/// component-syntax samples, and the component framework as JSX source.
fn baseline_options() -> Map<String, Value> {
    let mut options = Map::new();
    options.insert("lib".to_string(), serde_json::json!(["esnext", "dom"]));
    options.insert("jsx".to_string(), serde_json::json!("preserve"));
    options.insert("jsxImportSource".to_string(), serde_json::json!("vue"));
    options
}

/// The type-checking/highlighting capability the driver invokes per sample.
///
/// Implementations receive the sample verbatim (content, language, raw
/// metadata) and raise on any failure; the driver records the error against
/// the sample's file and line and moves on.
pub trait SampleChecker {
    fn check(&self, sample: &CodeSample) -> impl Future<Output = Result<()>>;
}

/// Checks samples by driving the TypeScript compiler over a scratch
/// project.
///
/// For each sample the checker resolves the governing context, materializes
/// a throwaway project directory (generated declaration files, the
/// prologue-prefixed sample as a virtual source file, and a `tsconfig.json`
/// carrying the merged options) and runs `tsc --noEmit` against it. The
/// compiler's diagnostics become the opaque error payload.
///
/// Expensive inputs (configuration set, declaration files) are resolved
/// once per session and reused across samples and watch-mode re-runs.
pub struct TscChecker {
    merger: OptionsMerger,
    /// Virtual declaration files, keyed by their namespaced path. `None`
    /// when project types were not resolved; the prologue is skipped too.
    type_declarations: Option<BTreeMap<String, String>>,
    languages: LanguageRegistry,
    compiler: String,
    flags: Vec<String>,
}

impl TscChecker {
    pub fn new(merger: OptionsMerger, type_declarations: Option<BTreeMap<String, String>>) -> Self {
        Self {
            merger,
            type_declarations,
            languages: LanguageRegistry::with_defaults(),
            compiler: "tsc".to_string(),
            flags: vec![
                "--noEmit".to_string(),
                "--pretty".to_string(),
                "false".to_string(),
            ],
        }
    }

    pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = languages;
        self
    }

    /// Use a specific compiler executable instead of `tsc` from `PATH`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, contains shell
    /// metacharacters, or uses parent directory traversal.
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Result<Self> {
        let compiler = compiler.into();
        validate_compiler_path(&compiler)?;
        self.compiler = compiler;
        Ok(self)
    }

    async fn check_sample(&self, sample: &CodeSample) -> Result<()> {
        if !self.languages.contains(&sample.language) {
            anyhow::bail!(
                "unknown fence language `{}` (register it with --languages)",
                sample.language
            );
        }
        if !language::is_type_checked(&sample.language) {
            return Ok(());
        }

        let scratch = TempDir::new().context("Failed to create scratch project directory")?;
        let context = self.merger.detect(Some(&sample.raw_meta));
        let compiler_options = self.merger.resolve(context, None);
        log::debug!(
            "Checking {} block from {}:{} (context: {})",
            sample.language,
            sample.source_file.display(),
            sample.line,
            context
        );

        let sample_file = language::sample_file_name(&sample.language);
        let mut source = String::new();
        if let Some(declarations) = &self.type_declarations {
            self.write_declarations(scratch.path(), declarations).await?;
            source.push_str(&build_prologue(scratch.path(), context));
        }
        source.push_str(&sample.content);

        tokio::fs::write(scratch.path().join(sample_file), &source)
            .await
            .with_context(|| format!("Failed to write {sample_file}"))?;

        let mut include = vec![sample_file.to_string()];
        if self.type_declarations.is_some() {
            include.push(".nuxt/**/*.d.ts".to_string());
        }
        let tsconfig = serde_json::json!({
            "compilerOptions": Value::Object(compiler_options),
            "include": include,
        });
        let tsconfig_path = scratch.path().join("tsconfig.json");
        tokio::fs::write(&tsconfig_path, serde_json::to_string_pretty(&tsconfig)?)
            .await
            .context("Failed to write scratch tsconfig.json")?;

        let output = Command::new(&self.compiler)
            .args(&self.flags)
            .arg("--project")
            .arg(&tsconfig_path)
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to execute TypeScript compiler '{}' for {}:{}",
                    self.compiler,
                    sample.source_file.display(),
                    sample.line
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let diagnostics = if !stderr.trim().is_empty() {
                stderr.to_string()
            } else {
                stdout.to_string()
            };
            // Scratch paths mean nothing to the reader.
            let diagnostics =
                diagnostics.replace(&scratch.path().display().to_string(), "");
            anyhow::bail!("type check failed\n{}", diagnostics.trim_end());
        }

        Ok(())
    }

    async fn write_declarations(
        &self,
        scratch_dir: &Path,
        declarations: &BTreeMap<String, String>,
    ) -> Result<()> {
        for (virtual_path, contents) in declarations {
            let dest = scratch_dir.join(virtual_path);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            tokio::fs::write(&dest, contents)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        }
        Ok(())
    }
}

impl SampleChecker for TscChecker {
    fn check(&self, sample: &CodeSample) -> impl Future<Output = Result<()>> {
        self.check_sample(sample)
    }
}

/// Reject compiler paths that could smuggle shell syntax or escape the
/// expected location.
fn validate_compiler_path(compiler: &str) -> Result<()> {
    if compiler.is_empty() {
        anyhow::bail!("Compiler path cannot be empty");
    }

    let dangerous_chars = [';', '|', '&', '`', '\n', '\r'];
    for ch in dangerous_chars {
        if compiler.contains(ch) {
            anyhow::bail!(
                "Compiler path contains invalid character '{}': {}",
                ch.escape_default(),
                compiler
            );
        }
    }

    let path = Path::new(compiler);
    for component in path.components() {
        if matches!(component, std::path::Component::ParentDir) {
            anyhow::bail!("Compiler path cannot contain '..': {}", compiler);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigEntry;
    use serde_json::json;
    use std::path::PathBuf;

    fn options(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    fn sample(language: &str, content: &str, meta: &str) -> CodeSample {
        CodeSample {
            content: content.to_string(),
            language: language.to_string(),
            source_file: PathBuf::from("docs/index.md"),
            line: 1,
            raw_meta: meta.to_string(),
        }
    }

    #[test]
    fn test_merge_precedence_baseline_context_user() {
        let configs = ConfigSet {
            default: Map::new(),
            server: Some(ConfigEntry {
                compiler_options: options(&[("lib", json!(["esnext"]))]),
                include: Some(vec!["server/**/*".to_string()]),
                exclude: None,
            }),
            ..ConfigSet::default()
        };
        let merger = OptionsMerger::new(
            Some(configs),
            options(&[("strict", json!(true))]),
        );

        let context = merger.detect(Some("twoslash [server/api/hello.ts]"));
        assert_eq!(context, Context::Server);

        let resolved = merger.resolve(context, None);
        // Context overwrites the baseline lib, user options land on top.
        assert_eq!(resolved.get("lib"), Some(&json!(["esnext"])));
        assert_eq!(resolved.get("jsx"), Some(&json!("preserve")));
        assert_eq!(resolved.get("jsxImportSource"), Some(&json!("vue")));
        assert_eq!(resolved.get("strict"), Some(&json!(true)));
    }

    #[test]
    fn test_invocation_options_win_over_everything() {
        let merger = OptionsMerger::new(None, options(&[("strict", json!(true))]));
        let invocation = options(&[("strict", json!(false))]);
        let resolved = merger.resolve(Context::Default, Some(&invocation));
        assert_eq!(resolved.get("strict"), Some(&json!(false)));
    }

    #[test]
    fn test_merger_without_configs_still_has_baseline() {
        let merger = OptionsMerger::default();
        let resolved = merger.resolve(Context::Default, None);
        assert_eq!(resolved.get("lib"), Some(&json!(["esnext", "dom"])));
        assert_eq!(resolved.get("jsx"), Some(&json!("preserve")));
    }

    #[tokio::test]
    async fn test_unknown_language_is_rejected() {
        let checker = TscChecker::new(OptionsMerger::default(), None);
        let error = checker
            .check(&sample("haskell", "main = pure ()", "twoslash"))
            .await
            .expect_err("unknown language must fail");
        assert!(error.to_string().contains("unknown fence language"));
    }

    #[tokio::test]
    async fn test_known_non_typescript_language_passes_unchecked() {
        let checker = TscChecker::new(OptionsMerger::default(), None);
        // No compiler is invoked for highlight-only languages, so this
        // passes even where no `tsc` is installed.
        checker
            .check(&sample("vue", "<template><div /></template>", "twoslash"))
            .await
            .expect("vue sample is highlight-only");

        let mut languages = LanguageRegistry::with_defaults();
        languages.extend_from_list("python");
        let checker = TscChecker::new(OptionsMerger::default(), None).with_languages(languages);
        checker
            .check(&sample("python", "x = 1", "twoslash"))
            .await
            .expect("registered language is highlight-only");
    }

    #[test]
    fn test_compiler_path_validation() {
        assert!(validate_compiler_path("tsc").is_ok());
        assert!(validate_compiler_path("/usr/local/bin/tsc").is_ok());
        assert!(validate_compiler_path("").is_err());
        assert!(validate_compiler_path("tsc; rm -rf /").is_err());
        assert!(validate_compiler_path("../tsc").is_err());
    }
}
