//! Front-matter extraction.
//!
//! Two block styles are recognised at the very top of a file:
//!
//! ```text
//! ---                      +++
//! title: Hello             title = "Hello"
//! date: 2015-08-01         date = 2015-08-01
//! ---                      +++
//! ```
//!
//! The YAML-like form is deliberately simple: one `key: value` pair per
//! line, `#` comments, scalar values or a `[a, b]` list. Anything fancier
//! belongs in a TOML block.

use serde_json::Value;

use super::MetaMap;

const YAML_MARKER: &str = "---";
const TOML_MARKER: &str = "+++";

/// Split `content` into its front-matter map and Markdown body.
///
/// Returns an empty map and the whole input when there is no front-matter.
/// The error string describes what is malformed; the caller attaches the path.
pub fn split(content: &str) -> Result<(MetaMap, &str), String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some((first, rest)) = split_first_line(content) else {
        return Ok((MetaMap::new(), content));
    };

    let marker = match first.trim_end() {
        YAML_MARKER => YAML_MARKER,
        TOML_MARKER => TOML_MARKER,
        _ => return Ok((MetaMap::new(), content)),
    };

    let (block, body) = find_closing(rest, marker)
        .ok_or_else(|| format!("unterminated front-matter (missing closing `{marker}`)"))?;

    let meta = if marker == TOML_MARKER {
        parse_toml(block)?
    } else {
        parse_yaml_like(block)?
    };

    Ok((meta, body.trim_start_matches(['\r', '\n'])))
}

fn split_first_line(content: &str) -> Option<(&str, &str)> {
    match content.find('\n') {
        Some(idx) => Some((&content[..idx], &content[idx + 1..])),
        None if content.trim_end() == YAML_MARKER || content.trim_end() == TOML_MARKER => {
            Some((content, ""))
        }
        None => None,
    }
}

/// Find the closing marker line; returns `(block, body)`.
fn find_closing<'a>(rest: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == marker {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_yaml_like(block: &str) -> Result<MetaMap, String> {
    let mut meta = MetaMap::new();

    for (idx, line) in block.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(format!("line {}: expected `key: value`", idx + 2));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("line {}: empty key", idx + 2));
        }

        meta.insert(key.to_string(), parse_scalar(value.trim()));
    }

    Ok(meta)
}

/// Interpret a YAML-like value.
///
/// `true`/`false`, `null`/`~`, integers, floats, `[a, b]` lists, quoted or
/// bare strings. Dates stay strings; the article parser reads them lazily.
fn parse_scalar(s: &str) -> Value {
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s == "~" {
        return Value::Null;
    }
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = s.parse::<f64>()
        && let Some(num) = serde_json::Number::from_f64(n)
    {
        return Value::Number(num);
    }
    if let Some(inner) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return Value::Array(
            inner
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(parse_scalar)
                .collect(),
        );
    }

    Value::String(unquote(s).to_string())
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn parse_toml(block: &str) -> Result<MetaMap, String> {
    let table: toml::Table = toml::from_str(block).map_err(|e| format!("invalid TOML: {e}"))?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect())
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(n) => Value::Number(n.into()),
        toml::Value::Float(n) => serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}
