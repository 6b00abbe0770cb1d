use crate::context::Context;
use crate::declarations::BUILD_DIR_NAME;
use std::path::Path;

/// The generated declarations file a context's samples reference, relative
/// to the build output directory. Every context has exactly one target; the
/// fallback shares the general application surface.
pub fn declarations_file(context: Context) -> &'static str {
    match context {
        Context::Node => "nuxt.node.d.ts",
        Context::Server => "nuxt.server.d.ts",
        Context::Shared => "nuxt.shared.d.ts",
        Context::App | Context::Default => "nuxt.d.ts",
    }
}

/// Build the synthetic header prepended to a sample's virtual source file.
///
/// One triple-slash reference line selecting the context's generated
/// declarations, followed by a blank line, so ambient and auto-registered
/// globals resolve without explicit imports in the sample itself.
pub fn build_prologue(root_dir: &Path, context: Context) -> String {
    let target = root_dir.join(BUILD_DIR_NAME).join(declarations_file(context));
    format!("/// <reference path=\"{}\" />\n\n", target.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_each_context_has_a_declarations_file() {
        assert_eq!(declarations_file(Context::App), "nuxt.d.ts");
        assert_eq!(declarations_file(Context::Node), "nuxt.node.d.ts");
        assert_eq!(declarations_file(Context::Server), "nuxt.server.d.ts");
        assert_eq!(declarations_file(Context::Shared), "nuxt.shared.d.ts");
    }

    #[test]
    fn test_fallback_uses_the_application_surface() {
        assert_eq!(
            declarations_file(Context::Default),
            declarations_file(Context::App)
        );
    }

    #[test]
    fn test_prologue_references_build_dir_and_ends_with_blank_line() {
        let root = PathBuf::from("/proj");
        let prologue = build_prologue(&root, Context::Server);

        assert!(prologue.starts_with("/// <reference path=\""));
        assert!(prologue.contains(".nuxt"));
        assert!(prologue.contains("nuxt.server.d.ts"));
        assert!(prologue.ends_with("/>\n\n"));
    }
}
