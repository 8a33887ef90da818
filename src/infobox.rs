use std::collections::BTreeMap;

use crate::wikitext::Template;

/// Pull the requested parameters out of every matching infobox invocation.
///
/// Parameter names become column-safe keys (spaces → underscores). Only
/// parameters whose value is non-empty after trimming are recorded. When a
/// document carries several matching invocations the later one wins per key;
/// in practice there is at most one. No match at all is an empty mapping,
/// not an error.
pub fn extract(
    templates: &[Template],
    template_name: &str,
    parameters: &[String],
) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for template in templates {
        if !template.name_matches(template_name) {
            continue;
        }
        for parameter in parameters {
            if let Some(raw) = template.param(parameter) {
                let value = raw.trim_end();
                if !value.trim().is_empty() {
                    fields.insert(parameter.replace(' ', "_"), value.to_string());
                }
            }
        }
    }
    fields
}

// ── Tests ──
