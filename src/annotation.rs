//! Trailing-comment annotations on document lines.
//!
//! Equipment documents attach a unit and a description to each key with a
//! trailing comment:
//!
//! ```toml
//! [shaker]
//! nominal_force = 5000        # [N] Sine force, peak
//! armature_mass = 4.5         # [kg]
//! cooling = "air"             # Cooling method
//! ```
//!
//! - `[N] Sine force, peak` → unit `N`, description `Sine force, peak`
//! - `[kg]` → unit `kg`, empty description
//! - `Cooling method` → empty unit, description `Cooling method`
//!
//! TOML parsers discard comments, so this module scans the raw text line by
//! line, tracking the current `[section]` header. Annotations are keyed by
//! the full table path and the last key segment, so `coil.resistance = 2.1`
//! under `[shaker]` is found as `("shaker.coil", "resistance")`. A key with
//! no comment of its own has an empty annotation.

use std::collections::HashMap;

/// Unit and description attached to a key. Both empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub unit: String,
    pub description: String,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        self.unit.is_empty() && self.description.is_empty()
    }
}

/// Parse the text of a comment (without the leading `#`).
pub fn parse_comment(comment: &str) -> Annotation {
    let comment = comment.trim();
    if let Some(rest) = comment.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return Annotation {
                unit: rest[..end].trim().to_string(),
                description: rest[end + 1..].trim().to_string(),
            };
        }
    }
    Annotation {
        unit: String::new(),
        description: comment.to_string(),
    }
}

/// All annotations found in one document.
#[derive(Debug, Default)]
pub struct Annotations {
    by_section: HashMap<(String, String), Annotation>,
}

impl Annotations {
    /// Scan raw document text for `key = value # comment` lines.
    ///
    /// Keys before the first header belong to the section `""`.
    pub fn scan(text: &str) -> Self {
        let mut annotations = Annotations::default();
        let mut section = String::new();

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.starts_with('[') {
                let header = match find_comment_start(trimmed) {
                    Some(pos) => trimmed[..pos].trim(),
                    None => trimmed,
                };
                section = parse_header(header);
                continue;
            }
            let Some(eq) = find_unquoted(trimmed, '=') else {
                continue;
            };
            let mut path = split_dotted(&trimmed[..eq]);
            let Some(key) = path.pop().filter(|k| !k.is_empty()) else {
                continue;
            };
            let value_part = &trimmed[eq + 1..];
            let Some(hash) = find_comment_start(value_part) else {
                continue;
            };
            if !section.is_empty() {
                path.insert(0, section.clone());
            }
            annotations
                .by_section
                .insert((path.join("."), key), parse_comment(&value_part[hash + 1..]));
        }

        annotations
    }

    /// Annotation for `key` in the table at `section`, or an empty one.
    pub fn get(&self, section: &str, key: &str) -> Annotation {
        self.by_section
            .get(&(section.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// `[shaker]` → `shaker`, `[[runs]]` → `runs`, `["odd name"]` → `odd name`.
fn parse_header(header: &str) -> String {
    let inner = header.trim_start_matches('[').trim_end_matches(']').trim();
    split_dotted(inner).join(".")
}

/// `coil."dc.resistance"` → `["coil", "dc.resistance"]`.
fn split_dotted(path: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = path;
    while let Some(dot) = find_unquoted(rest, '.') {
        parts.push(unquote(&rest[..dot]));
        rest = &rest[dot + 1..];
    }
    parts.push(unquote(rest));
    parts
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

/// Byte offset of the first `#` that is not inside a string literal.
fn find_comment_start(s: &str) -> Option<usize> {
    find_unquoted(s, '#')
}

fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' && q == '"' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c == target {
                    return Some(i);
                }
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Comment parsing
    // =========================================================================

    #[test]
    fn unit_and_description() {
        let a = parse_comment(" [N] Sine force, peak");
        assert_eq!(a.unit, "N");
        assert_eq!(a.description, "Sine force, peak");
    }

    #[test]
    fn unit_only() {
        let a = parse_comment("[kg]");
        assert_eq!(a.unit, "kg");
        assert_eq!(a.description, "");
    }

    #[test]
    fn description_only() {
        let a = parse_comment("Cooling method");
        assert_eq!(a.unit, "");
        assert_eq!(a.description, "Cooling method");
    }

    #[test]
    fn unclosed_bracket_is_description() {
        let a = parse_comment("[mm travel");
        assert_eq!(a.unit, "");
        assert_eq!(a.description, "[mm travel");
    }

    #[test]
    fn unit_with_symbols() {
        let a = parse_comment("[m/s²] Max acceleration");
        assert_eq!(a.unit, "m/s²");
        assert_eq!(a.description, "Max acceleration");
    }

    // =========================================================================
    // Document scanning
    // =========================================================================

    #[test]
    fn scan_tracks_sections() {
        let text = r#"
[shaker]
mass = 4.5 # [kg] Armature mass

[table]
mass = 12 # [kg] Slip table mass
"#;
        let a = Annotations::scan(text);
        assert_eq!(a.get("shaker", "mass").description, "Armature mass");
        assert_eq!(a.get("table", "mass").description, "Slip table mass");
    }

    #[test]
    fn same_key_elsewhere_does_not_leak() {
        let text = "[armature]\nmass = 4.5\n\n[slip_table]\nmass = 30 # [kg] Slip table mass\n";
        let a = Annotations::scan(text);
        assert!(a.get("armature", "mass").is_empty());
        assert_eq!(a.get("slip_table", "mass").unit, "kg");
    }

    #[test]
    fn dotted_key_joins_table_path() {
        let a = Annotations::scan("[shaker]\ncoil.resistance = 2.1 # [Ohm] DC resistance\n");
        assert_eq!(a.get("shaker.coil", "resistance").unit, "Ohm");
        assert!(a.get("shaker", "coil.resistance").is_empty());

        let top = Annotations::scan("coil.turns = 40 # Winding turns\n");
        assert_eq!(top.get("coil", "turns").description, "Winding turns");
    }

    #[test]
    fn quoted_key_keeps_its_dot() {
        let a = Annotations::scan("[shaker]\n\"dc.resistance\" = 2.1 # [Ohm]\n");
        assert_eq!(a.get("shaker", "dc.resistance").unit, "Ohm");
    }

    #[test]
    fn missing_comment_yields_empty_annotation() {
        let a = Annotations::scan("[shaker]\nmodel = \"V830\"\n");
        assert!(a.get("shaker", "model").is_empty());
    }

    #[test]
    fn hash_inside_string_is_not_a_comment() {
        let a = Annotations::scan("[shaker]\nmodel = \"V#830\" # Model name\n");
        assert_eq!(a.get("shaker", "model").description, "Model name");

        let b = Annotations::scan("[shaker]\nmodel = 'V#830'\n");
        assert!(b.get("shaker", "model").is_empty());
    }

    #[test]
    fn escaped_quote_inside_string() {
        let a = Annotations::scan(r#"note = "say \"hi\" # not" # [x] real"#);
        assert_eq!(a.get("", "note").unit, "x");
        assert_eq!(a.get("", "note").description, "real");
    }

    #[test]
    fn header_with_trailing_comment() {
        let a = Annotations::scan("[shaker] # main unit\nforce = 1 # [N]\n");
        assert_eq!(a.get("shaker", "force").unit, "N");
    }

    #[test]
    fn nested_and_quoted_headers() {
        let a = Annotations::scan("[shaker.\"coil\"]\nresistance = 2 # [Ohm]\n");
        assert_eq!(a.get("shaker.coil", "resistance").unit, "Ohm");
    }

    #[test]
    fn check_formula_comment() {
        let text = "[additional_checks]\nforce_ok = \"a > b\" # [-] Force margin\n";
        let a = Annotations::scan(text);
        assert_eq!(a.get("additional_checks", "force_ok").unit, "-");
        assert_eq!(a.get("additional_checks", "force_ok").description, "Force margin");
    }
}
