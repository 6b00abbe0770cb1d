use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the build output directory under the project root.
pub const BUILD_DIR_NAME: &str = ".nuxt";

/// Namespace prefix for virtual declaration files handed to the checker.
pub const VIRTUAL_PREFIX: &str = ".nuxt/";

/// Collect every generated `.d.ts` file under the build output directory
/// into a virtual-path → contents map, keys prefixed with
/// [`VIRTUAL_PREFIX`]. A missing directory yields an empty map; ordering is
/// deterministic (sorted by path).
pub async fn collect_type_declarations(build_dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut declarations = BTreeMap::new();
    if !build_dir.is_dir() {
        return Ok(declarations);
    }

    let mut paths = Vec::new();
    walk_declaration_files(build_dir, &mut paths)
        .with_context(|| format!("Failed to scan {}", build_dir.display()))?;
    paths.sort();

    for path in paths {
        let relative = path
            .strip_prefix(build_dir)
            .unwrap_or(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        declarations.insert(format!("{VIRTUAL_PREFIX}{relative}"), contents);
    }

    Ok(declarations)
}

fn walk_declaration_files(dir: &Path, paths: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk_declaration_files(&path, paths)?;
        } else if file_type.is_file() {
            let is_declaration = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(".d.ts"));
            if is_declaration {
                paths.push(path);
            }
        }
    }
    Ok(())
}
