//! YAML frontmatter splitting and value conversion.

use crate::document::FmValue;
use std::collections::BTreeMap;

/// Parse failure for a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unterminated frontmatter block")]
    UnterminatedFrontmatter,
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// The split result: parsed frontmatter, the body, and the 1-based line the
/// body starts on.
pub struct SplitDocument {
    pub frontmatter: BTreeMap<String, FmValue>,
    pub body: String,
    pub body_start_line: usize,
}

/// Split a leading `---` frontmatter block off `text` and parse it.
///
/// A document without a frontmatter fence is returned unchanged with an empty
/// map. A fence that never closes is an error; the pipeline skips the
/// document.
pub fn split(text: &str) -> Result<SplitDocument, ParseError> {
    let Some(rest) = text.strip_prefix("---\n").or_else(|| text.strip_prefix("---\r\n")) else {
        return Ok(SplitDocument {
            frontmatter: BTreeMap::new(),
            body: text.to_string(),
            body_start_line: 1,
        });
    };

    let mut yaml_end = None;
    let mut offset = 0;
    // split_inclusive also yields a bare closing fence with no trailing
    // newline at EOF.
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            yaml_end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((yaml_len, body_offset)) = yaml_end else {
        return Err(ParseError::UnterminatedFrontmatter);
    };

    let yaml = &rest[..yaml_len];
    let body = &rest[body_offset..];
    let body_start_line = 2 + yaml.matches('\n').count() + 1;

    let frontmatter = if yaml.trim().is_empty() {
        BTreeMap::new()
    } else {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        match value {
            serde_yaml::Value::Mapping(map) => map
                .into_iter()
                .filter_map(|(k, v)| {
                    let key = yaml_key_string(&k)?;
                    Some((key, convert(v)))
                })
                .collect(),
            // Frontmatter that is not a mapping carries no fields.
            _ => BTreeMap::new(),
        }
    };

    Ok(SplitDocument {
        frontmatter,
        body: body.to_string(),
        body_start_line,
    })
}

fn yaml_key_string(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn convert(value: serde_yaml::Value) -> FmValue {
    match value {
        serde_yaml::Value::String(s) => FmValue::Str(s),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                FmValue::Int(i)
            } else {
                FmValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_yaml::Value::Bool(b) => FmValue::Bool(b),
        serde_yaml::Value::Sequence(seq) => FmValue::List(seq.into_iter().map(convert).collect()),
        serde_yaml::Value::Null => FmValue::Str(String::new()),
        // Nested mappings and tags flatten to their YAML text form.
        other => FmValue::Str(serde_yaml::to_string(&other).unwrap_or_default().trim_end().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_frontmatter() {
        let split = split("# Hello\n\nBody.\n").unwrap();
        assert!(split.frontmatter.is_empty());
        assert_eq!(split.body_start_line, 1);
        assert!(split.body.starts_with("# Hello"));
    }

    #[test]
    fn test_basic_frontmatter() {
        let text = "---\ntitle: Weekly Sync\nversion: 2\ndraft: true\n---\n\nBody.\n";
        let split = split(text).unwrap();
        assert_eq!(
            split.frontmatter.get("title"),
            Some(&FmValue::Str("Weekly Sync".into()))
        );
        assert_eq!(split.frontmatter.get("version"), Some(&FmValue::Int(2)));
        assert_eq!(split.frontmatter.get("draft"), Some(&FmValue::Bool(true)));
        assert_eq!(split.body_start_line, 6);
        assert_eq!(split.body, "\nBody.\n");
    }

    #[test]
    fn test_list_values() {
        let text = "---\nattendees:\n  - Alex\n  - Jordan\n---\nBody.\n";
        let split = split(text).unwrap();
        assert_eq!(
            split.frontmatter.get("attendees"),
            Some(&FmValue::List(vec![
                FmValue::Str("Alex".into()),
                FmValue::Str("Jordan".into()),
            ]))
        );
    }

    #[test]
    fn test_unterminated_frontmatter_is_error() {
        assert!(split("---\ntitle: X\nno close\n").is_err());
    }

    #[test]
    fn test_dates_stay_strings() {
        let text = "---\ncreated: 2024-11-07\n---\n";
        let split = split(text).unwrap();
        assert_eq!(
            split.frontmatter.get("created"),
            Some(&FmValue::Str("2024-11-07".into()))
        );
    }
}
