use crate::config::ConfigSet;
use crate::context::Context;
use serde_json::{Map, Value};

/// Flatten the effective compiler options for a context.
///
/// The fallback context, and any named context whose slot was not loaded,
/// resolve to the `default` options. A loaded slot's options are returned
/// verbatim; merging with baseline and user overrides happens in the
/// caller, via [`merge_ordered`].
pub fn compiler_options_for_context(
    configs: Option<&ConfigSet>,
    context: Context,
) -> Map<String, Value> {
    let Some(configs) = configs else {
        return Map::new();
    };

    match configs.entry(context) {
        Some(entry) => entry.compiler_options.clone(),
        None => configs.default.clone(),
    }
}

/// Merge an ordered sequence of option mappings, left to right.
///
/// Later sources overwrite earlier ones key by key; values are not deep
/// merged. This is the single merge primitive used everywhere a precedence
/// chain is applied (baseline → context → user override → invocation
/// override).
pub fn merge_ordered<'a>(
    sources: impl IntoIterator<Item = &'a Map<String, Value>>,
) -> Map<String, Value> {
    let mut merged = Map::new();
    for source in sources {
        for (key, value) in source {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
