/// A single `{{...}}` invocation: its name plus declared parameters in
/// source order. Positional parameters get the keys "1", "2", ...
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub params: Vec<(String, String)>,
}

impl Template {
    /// Case-insensitive match ignoring surrounding and internal runs of
    /// whitespace, the way wiki template names are compared.
    pub fn name_matches(&self, other: &str) -> bool {
        normalize_name(&self.name) == normalize_name(other)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Scan raw wiki markup into the sequence of template invocations it
/// contains, nested ones included. Parameter values keep their embedded
/// markup untouched. Unbalanced braces are skipped, never an error.
pub fn parse_templates(text: &str) -> Vec<Template> {
    let mut out = Vec::new();
    collect(text, &mut out);
    out
}

fn collect(text: &str, out: &mut Vec<Template>) {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            match find_close(bytes, i + 2) {
                Some(end) => {
                    let inner = &text[i + 2..end];
                    if let Some(template) = parse_invocation(inner) {
                        out.push(template);
                    }
                    // Templates nested in parameter values count too.
                    collect(inner, out);
                    i = end + 2;
                    continue;
                }
                None => {
                    i += 2;
                    continue;
                }
            }
        }
        i += 1;
    }
}

/// Position of the matching `}}` for a template whose body starts at
/// `start`, tracking `{{ }}` nesting.
fn find_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'{', b'{') => {
                depth += 1;
                i += 2;
            }
            (b'}', b'}') => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
                i += 2;
            }
            _ => i += 1,
        }
    }
    None
}

fn parse_invocation(inner: &str) -> Option<Template> {
    let mut parts = split_top_level(inner);
    if parts.is_empty() {
        return None;
    }
    let name = parts.remove(0).trim().to_string();
    if name.is_empty() {
        return None;
    }

    let mut params = Vec::new();
    let mut position = 0usize;
    for part in parts {
        match top_level_eq(&part) {
            Some(eq) => {
                let key = part[..eq].trim().to_string();
                let value = part[eq + 1..].to_string();
                params.push((key, value));
            }
            None => {
                position += 1;
                params.push((position.to_string(), part));
            }
        }
    }
    Some(Template { name, params })
}

/// Split template content on `|` at nesting depth zero. Pipes inside
/// nested `{{ }}` or `[[ ]]` belong to the parameter value.
fn split_top_level(inner: &str) -> Vec<String> {
    let bytes = inner.as_bytes();
    let mut parts = Vec::new();
    let mut brace = 0usize;
    let mut bracket = 0usize;
    let mut start = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if i + 1 < bytes.len() && bytes[i + 1] == b'{' => {
                brace += 1;
                i += 2;
            }
            b'}' if i + 1 < bytes.len() && bytes[i + 1] == b'}' => {
                brace = brace.saturating_sub(1);
                i += 2;
            }
            b'[' if i + 1 < bytes.len() && bytes[i + 1] == b'[' => {
                bracket += 1;
                i += 2;
            }
            b']' if i + 1 < bytes.len() && bytes[i + 1] == b']' => {
                bracket = bracket.saturating_sub(1);
                i += 2;
            }
            b'|' if brace == 0 && bracket == 0 => {
                parts.push(inner[start..i].to_string());
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    parts.push(inner[start..].to_string());
    parts
}

/// Byte offset of the first `=` outside nested markup, if any. Named and
/// positional parameters are told apart by its presence.
fn top_level_eq(part: &str) -> Option<usize> {
    let bytes = part.as_bytes();
    let mut brace = 0usize;
    let mut bracket = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if i + 1 < bytes.len() && bytes[i + 1] == b'{' => {
                brace += 1;
                i += 2;
            }
            b'}' if i + 1 < bytes.len() && bytes[i + 1] == b'}' => {
                brace = brace.saturating_sub(1);
                i += 2;
            }
            b'[' if i + 1 < bytes.len() && bytes[i + 1] == b'[' => {
                bracket += 1;
                i += 2;
            }
            b']' if i + 1 < bytes.len() && bytes[i + 1] == b']' => {
                bracket = bracket.saturating_sub(1);
                i += 2;
            }
            b'=' if brace == 0 && bracket == 0 => return Some(i),
            _ => i += 1,
        }
    }
    None
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_parameters_in_order() {
        let templates = parse_templates(
            "{{Infobox ship career\n|Ship name=HMS Warrior\n|Ship builder=[[Thames Iron Works|Thames Ironworks]]\n}}",
        );
        assert_eq!(templates.len(), 1);
        let t = &templates[0];
        assert_eq!(t.name, "Infobox ship career");
        assert_eq!(t.param("Ship name").map(str::trim), Some("HMS Warrior"));
        assert_eq!(
            t.param("Ship builder").map(str::trim),
            Some("[[Thames Iron Works|Thames Ironworks]]")
        );
    }

    #[test]
    fn piped_links_do_not_split_parameters() {
        let templates = parse_templates("{{T|Ship builder=[[A|B]], [[C|D]]}}");
        assert_eq!(templates[0].param("Ship builder"), Some("[[A|B]], [[C|D]]"));
    }

    #[test]
    fn nested_templates_are_collected_and_kept_raw() {
        let templates =
            parse_templates("{{Infobox|Ship length={{convert|120.5|ft|m}}|Ship speed=10 kn}}");
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Infobox", "convert"]);
        assert_eq!(
            templates[0].param("Ship length"),
            Some("{{convert|120.5|ft|m}}")
        );
        assert_eq!(templates[1].param("1"), Some("120.5"));
        assert_eq!(templates[1].param("2"), Some("ft"));
    }

    #[test]
    fn name_match_ignores_case_and_whitespace() {
        let templates = parse_templates("{{ infobox   Ship Career |Ship name=x}}");
        assert!(templates[0].name_matches("Infobox ship career"));
        assert!(!templates[0].name_matches("Infobox ship characteristics"));
    }

    #[test]
    fn unbalanced_braces_are_tolerated() {
        assert!(parse_templates("{{broken|no close").is_empty());
        let templates = parse_templates("before {{Ok|1=x}} {{also broken");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Ok");
    }

    #[test]
    fn positional_parameters_are_numbered() {
        let templates = parse_templates("{{convert|5600|LT|t}}");
        let t = &templates[0];
        assert_eq!(t.param("1"), Some("5600"));
        assert_eq!(t.param("2"), Some("LT"));
        assert_eq!(t.param("3"), Some("t"));
    }
}
