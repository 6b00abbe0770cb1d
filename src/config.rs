use crate::context::Context;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

/// The unconditional base configuration file.
const DEFAULT_CONFIG_FILE: &str = "tsconfig.json";

/// Named sub-configuration files, one per logical project area.
const SLOT_CONFIG_FILES: [(Context, &str); 4] = [
    (Context::App, "tsconfig.app.json"),
    (Context::Node, "tsconfig.node.json"),
    (Context::Server, "tsconfig.server.json"),
    (Context::Shared, "tsconfig.shared.json"),
];

/// The path alias that always resolves to the generated auto-import
/// declarations, regardless of what the configuration file maps it to.
const IMPORTS_ALIAS: &str = "#imports";
const IMPORTS_ALIAS_TARGET: &str = "./.nuxt/imports.d.ts";

/// One parsed configuration file: its compiler options plus the
/// include/exclude glob patterns that describe which files it governs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigEntry {
    pub compiler_options: Map<String, Value>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

impl ConfigEntry {
    fn empty() -> Self {
        Self::default()
    }
}

/// The full set of discovered project configurations.
///
/// `default` is always present (possibly empty). A named slot is present
/// only when its configuration file parsed to a non-empty compiler-options
/// mapping, so an empty placeholder file never masks the `default` fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSet {
    /// Fallback compiler options from `tsconfig.json`.
    pub default: Map<String, Value>,
    /// Components, pages, composables and plugins (`tsconfig.app.json`).
    pub app: Option<ConfigEntry>,
    /// Config files, modules and build tooling (`tsconfig.node.json`).
    pub node: Option<ConfigEntry>,
    /// Server-side handlers (`tsconfig.server.json`).
    pub server: Option<ConfigEntry>,
    /// Code shared between app and server (`tsconfig.shared.json`).
    pub shared: Option<ConfigEntry>,
}

impl ConfigSet {
    /// The entry for a named context, if one was loaded.
    /// The fallback context has no entry of its own.
    pub fn entry(&self, context: Context) -> Option<&ConfigEntry> {
        match context {
            Context::App => self.app.as_ref(),
            Context::Node => self.node.as_ref(),
            Context::Server => self.server.as_ref(),
            Context::Shared => self.shared.as_ref(),
            Context::Default => None,
        }
    }
}

/// Raw on-disk shape of a configuration file. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTsConfig {
    #[serde(rename = "compilerOptions")]
    compiler_options: Map<String, Value>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

/// Load the configuration set from the build output directory.
///
/// Absent files silently become empty entries. A malformed file degrades
/// only its own slot to an empty entry (logged), never its siblings, so a
/// broken `tsconfig.server.json` cannot take down the whole load.
///
/// Loading is a pure function of disk state: loading the same directory
/// twice yields structurally equal sets.
pub async fn load_config_set(dir: &Path) -> ConfigSet {
    let default_entry = parse_config_file(&dir.join(DEFAULT_CONFIG_FILE), dir).await;

    let mut configs = ConfigSet {
        default: default_entry.compiler_options,
        ..ConfigSet::default()
    };

    for (context, file_name) in SLOT_CONFIG_FILES {
        let entry = parse_config_file(&dir.join(file_name), dir).await;
        let slot = named_slot(entry);
        match context {
            Context::App => configs.app = slot,
            Context::Node => configs.node = slot,
            Context::Server => configs.server = slot,
            Context::Shared => configs.shared = slot,
            Context::Default => unreachable!("default has no named slot"),
        }
    }

    configs
}

/// A named slot only exists when it carries actual compiler options.
fn named_slot(entry: ConfigEntry) -> Option<ConfigEntry> {
    (!entry.compiler_options.is_empty()).then_some(entry)
}

async fn parse_config_file(path: &Path, dir: &Path) -> ConfigEntry {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return ConfigEntry::empty();
        }
        Err(error) => {
            log::error!("Failed to read {}: {}", path.display(), error);
            return ConfigEntry::empty();
        }
    };

    match parse_entry(&content, dir) {
        Ok(entry) => entry,
        Err(error) => {
            log::error!("Failed to parse {}: {}", path.display(), error);
            ConfigEntry::empty()
        }
    }
}

fn parse_entry(content: &str, dir: &Path) -> anyhow::Result<ConfigEntry> {
    let stripped = strip_json_comments(content);
    let raw: RawTsConfig = serde_json::from_str(&stripped)?;

    let mut compiler_options = raw.compiler_options;
    rewrite_paths(&mut compiler_options, dir);

    Ok(ConfigEntry {
        compiler_options,
        include: raw.include,
        exclude: raw.exclude,
    })
}

/// Strip `//` line comments before JSON parsing.
///
/// Not string-aware: generated configuration files never carry `//` inside
/// string values, and comment markers are cut to end of line.
pub fn strip_json_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| match line.find("//") {
            Some(index) => &line[..index],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrite `compilerOptions.paths` so entries resolve from the parent of the
/// build directory (the project root) instead of from the file's own
/// directory. The reserved `#imports` alias is always pinned to the
/// generated auto-import declarations file.
fn rewrite_paths(compiler_options: &mut Map<String, Value>, dir: &Path) {
    let Some(Value::Object(paths)) = compiler_options.get_mut("paths") else {
        return;
    };

    for (key, value) in paths.iter_mut() {
        if key == IMPORTS_ALIAS {
            *value = Value::Array(vec![Value::String(IMPORTS_ALIAS_TARGET.to_string())]);
            continue;
        }
        if let Value::Array(targets) = value {
            for target in targets.iter_mut() {
                if let Value::String(target) = target {
                    *target = rewrite_path_value(target, dir);
                }
            }
        }
    }
}

fn rewrite_path_value(value: &str, dir: &Path) -> String {
    let resolved = resolve_join(dir, value);
    let base = dir.parent().unwrap_or(dir);
    let relative = pathdiff::diff_paths(&resolved, base).unwrap_or(resolved);
    format!("./{}", path_with_forward_slashes(&relative))
}

/// Resolve a possibly-relative path against `dir`, folding `.` and `..`
/// components lexically (the target may not exist yet).
fn resolve_join(dir: &Path, value: &str) -> PathBuf {
    let candidate = Path::new(value);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }

    let mut resolved = dir.to_path_buf();
    for component in candidate.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}

fn path_with_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
