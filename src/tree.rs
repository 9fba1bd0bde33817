//! Nested JSON and YAML documents, addressed by slash pointers.
//!
//! Both walks are depth-first. A mapping's values are visited before the
//! value itself is considered for translation, so extraction order and
//! substitution order agree for every pointer.

use std::path::Path;

use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::policy::{Replacements, value_to_translate};
use crate::types::{FieldSet, Location, Message};

/// Serialization a tree document was read from and is written back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// JSON, written with a two-space indent.
    Json,
    /// YAML, written in block style. Scalar mapping keys are read as strings.
    Yaml,
}

/// Parse `content` into a tree.
///
/// # Errors
///
/// Returns `Error::MalformedInput` if the content is not valid in `syntax`.
pub fn parse(file: &Path, content: &str, syntax: Syntax) -> Result<Value, Error> {
    let parsed = match syntax {
        Syntax::Json => serde_json::from_str(content).map_err(|e| return e.to_string()),
        Syntax::Yaml => serde_yaml::from_str(content)
            .map_err(|e| return e.to_string())
            .and_then(yaml_to_tree),
    };
    return parsed.map_err(|reason| return Error::MalformedInput { file: file.to_path_buf(), reason });
}

/// Convert a YAML document to a tree. Scalar mapping keys (`1: foo`,
/// `true: bar`, `~: baz`) become their string form, so they are written
/// back quoted. Sequence or mapping keys are rejected.
fn yaml_to_tree(value: serde_yaml::Value) -> Result<Value, String> {
    return match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| return format!("number {n} has no JSON representation"))
            }
        },
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(items) => {
            items.into_iter().map(yaml_to_tree).collect::<Result<Vec<_>, _>>().map(Value::Array)
        },
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, child) in mapping {
                map.insert(yaml_key(key)?, yaml_to_tree(child)?);
            }
            Ok(Value::Object(map))
        },
        serde_yaml::Value::Tagged(tagged) => yaml_to_tree(tagged.value),
    };
}

/// String form of a scalar YAML mapping key.
fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    return match key {
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Mapping(_) | serde_yaml::Value::Sequence(_) => {
            Err("mapping keys must be scalars".to_string())
        },
    };
}

/// Serialize a tree. JSON output has no trailing newline.
///
/// # Errors
///
/// Returns `Error::MalformedInput` if the tree cannot be represented in `syntax`.
pub fn render(file: &Path, value: &Value, syntax: Syntax) -> Result<String, Error> {
    let rendered = match syntax {
        Syntax::Json => serde_json::to_string_pretty(value).map_err(|e| return e.to_string()),
        Syntax::Yaml => serde_yaml::to_string(value).map_err(|e| return e.to_string()),
    };
    return rendered.map_err(|reason| return Error::MalformedInput { file: file.to_path_buf(), reason });
}

/// Yield the translatable values of designated keys, tagged with their pointers.
pub fn extract(value: &Value, keys: &FieldSet) -> Vec<Message> {
    let mut messages = Vec::new();
    extract_into(value, "", keys, &mut messages);
    return messages;
}

/// Recursive step of [`extract`].
fn extract_into(value: &Value, pointer: &str, keys: &FieldSet, messages: &mut Vec<Message>) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                extract_into(item, &format!("{pointer}/{index}"), keys, messages);
            }
        },
        Value::Object(map) => {
            for (key, child) in map {
                let child_pointer = format!("{pointer}/{key}");
                extract_into(child, &child_pointer, keys, messages);
                if let Some(text) = value_to_translate(child, keys.contains(key)) {
                    messages.push(Message::new(Location::Pointer(child_pointer), text));
                }
            }
        },
        Value::Bool(_) | Value::Null | Value::Number(_) | Value::String(_) => {},
    }
}

/// Build a translated copy of `value`. The input is left untouched.
///
/// Each translatable value becomes its catalog translation with
/// `{{marker}}`s expanded afterwards, so markers in the source text stay part
/// of the lookup key.
pub fn translate(
    value: &Value,
    catalog: &dyn Catalog,
    keys: &FieldSet,
    replacements: &Replacements,
) -> Value {
    return match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| return translate(item, catalog, keys, replacements))
                .collect(),
        ),
        Value::Object(map) => {
            let mut translated = Map::with_capacity(map.len());
            for (key, child) in map {
                // Strings have no children, so this visits in extraction order.
                let child = match value_to_translate(child, keys.contains(key)) {
                    Some(text) => Value::String(replacements.expand(catalog.translate(text))),
                    None => translate(child, catalog, keys, replacements),
                };
                translated.insert(key.clone(), child);
            }
            Value::Object(translated)
        },
        Value::Bool(_) | Value::Null | Value::Number(_) | Value::String(_) => value.clone(),
    };
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::catalog::{Identity, JsonCatalog};

    /// Records every lookup, in order, and translates nothing.
    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl Catalog for Recorder {
        fn translate<'a>(&'a self, source: &'a str) -> &'a str {
            self.0.borrow_mut().push(source.to_string());
            return source;
        }
    }

    fn schema_keys() -> FieldSet {
        return ["title", "description"].into_iter().collect();
    }

    fn sample() -> Value {
        return json!({
            "title": "Schema for an Open Contracting Record package {{version}}",
            "definitions": {
                "record": {
                    "properties": {
                        "releases": {
                            "title": "Releases",
                            "description": "An array of linking identifiers or releases",
                            "type": "array",
                            "oneOf": [
                                {"title": "  Linked releases  ", "minItems": 1},
                                {"title": "  Embedded releases  "}
                            ]
                        }
                    }
                }
            }
        });
    }

    #[test]
    fn extracts_in_post_order_with_pointers() {
        let messages = extract(&sample(), &schema_keys());
        let pairs: Vec<(String, &str)> = messages
            .iter()
            .map(|m| return (m.location.to_string(), m.text.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("/title".to_string(), "Schema for an Open Contracting Record package {{version}}"),
                ("/definitions/record/properties/releases/title".to_string(), "Releases"),
                (
                    "/definitions/record/properties/releases/description".to_string(),
                    "An array of linking identifiers or releases"
                ),
                ("/definitions/record/properties/releases/oneOf/0/title".to_string(), "Linked releases"),
                ("/definitions/record/properties/releases/oneOf/1/title".to_string(), "Embedded releases"),
            ]
        );
    }

    #[test]
    fn nested_values_are_yielded_before_their_parent_key() {
        let value = json!({"title": {"title": "Inner"}, "description": "Outer"});
        let texts: Vec<String> = extract(&value, &schema_keys()).into_iter().map(|m| return m.text).collect();
        assert_eq!(texts, ["Inner", "Outer"]);
    }

    #[test]
    fn translates_designated_keys() {
        let value = json!({"title": "Releases", "oneOf": [{"title": "  Linked releases  "}]});
        let catalog: JsonCatalog =
            [("Releases", "Entregas"), ("Linked releases", "Entregas vinculadas")].into_iter().collect();
        let translated = translate(&value, &catalog, &schema_keys(), &Replacements::default());
        assert_eq!(
            translated,
            json!({"title": "Entregas", "oneOf": [{"title": "Entregas vinculadas"}]})
        );
    }

    #[test]
    fn expands_placeholders_after_lookup() {
        let value = json!({"title": "Schema {{version}}"});
        let catalog: JsonCatalog = [("Schema {{version}}", "Esquema {{version}}")].into_iter().collect();
        let replacements: Replacements = [("version", "1.1")].into_iter().collect();

        let recorder = Recorder::default();
        translate(&value, &recorder, &schema_keys(), &replacements);
        assert_eq!(*recorder.0.borrow(), ["Schema {{version}}"]);

        let translated = translate(&value, &catalog, &schema_keys(), &replacements);
        assert_eq!(translated, json!({"title": "Esquema 1.1"}));
    }

    #[test]
    fn undesignated_values_are_untouched() {
        let value = json!({"type": "  array  ", "title": " Releases ", "enum": ["open", " closed "]});
        let translated = translate(&value, &Identity, &schema_keys(), &Replacements::default());
        assert_eq!(
            translated,
            json!({"type": "  array  ", "title": "Releases", "enum": ["open", " closed "]})
        );
    }

    #[test]
    fn designated_non_strings_are_recursed_not_replaced() {
        let value = json!({"description": {"title": "Nested"}, "title": 3});
        let catalog: JsonCatalog = [("Nested", "Anidado")].into_iter().collect();
        let translated = translate(&value, &catalog, &schema_keys(), &Replacements::default());
        assert_eq!(translated, json!({"description": {"title": "Anidado"}, "title": 3}));
    }

    #[test]
    fn input_is_not_mutated() {
        let value = sample();
        let before = value.clone();
        let catalog: JsonCatalog = [("Releases", "Entregas")].into_iter().collect();
        let _ = translate(&value, &catalog, &schema_keys(), &Replacements::default());
        assert_eq!(value, before);
    }

    #[test]
    fn substitution_looks_up_exactly_what_extraction_yields() {
        let value = sample();
        let extracted: Vec<String> =
            extract(&value, &schema_keys()).into_iter().map(|m| return m.text).collect();

        let recorder = Recorder::default();
        translate(&value, &recorder, &schema_keys(), &Replacements::default());
        assert_eq!(*recorder.0.borrow(), extracted);
    }

    #[test]
    fn yaml_scalar_keys_become_strings() {
        let content = "1: foo\ntrue: bar\ntitle: Releases\n";
        let value = parse(Path::new("a.yaml"), content, Syntax::Yaml).unwrap();
        assert_eq!(value, json!({"1": "foo", "true": "bar", "title": "Releases"}));
        let texts: Vec<String> = extract(&value, &schema_keys()).into_iter().map(|m| return m.text).collect();
        assert_eq!(texts, ["Releases"]);
    }

    #[test]
    fn yaml_collection_keys_are_malformed() {
        let result = parse(Path::new("a.yaml"), "? [a, b]\n: foo\n", Syntax::Yaml);
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn key_order_is_preserved() {
        let content = r#"{"zeta": 1, "title": "T", "alpha": 2}"#;
        let value = parse(Path::new("a.json"), content, Syntax::Json).unwrap();
        let translated = translate(&value, &Identity, &schema_keys(), &Replacements::default());
        let keys: Vec<&String> = translated.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "title", "alpha"]);
    }

    #[test]
    fn renders_json_with_two_space_indent_and_unicode() {
        let rendered = render(Path::new("a.json"), &json!({"title": "Título", "n": [1]}), Syntax::Json).unwrap();
        assert_eq!(rendered, "{\n  \"title\": \"Título\",\n  \"n\": [\n    1\n  ]\n}");
    }

    #[test]
    fn yaml_round_trips_through_the_same_walk() {
        let content = "sections:\n- title: Disclosure\n  mapping: \"  Field  \"\n  id: d1\n";
        let keys: FieldSet = ["title", "mapping"].into_iter().collect();
        let value = parse(Path::new("m.yaml"), content, Syntax::Yaml).unwrap();

        let texts: Vec<String> = extract(&value, &keys).into_iter().map(|m| return m.text).collect();
        assert_eq!(texts, ["Disclosure", "Field"]);

        let catalog: JsonCatalog = [("Disclosure", "Divulgación"), ("Field", "Campo")].into_iter().collect();
        let translated = translate(&value, &catalog, &keys, &Replacements::default());
        let rendered = render(Path::new("m.yaml"), &translated, Syntax::Yaml).unwrap();
        assert!(rendered.contains("Divulgación"), "unicode escaped: {rendered}");
        let reparsed = parse(Path::new("m.yaml"), &rendered, Syntax::Yaml).unwrap();
        assert_eq!(
            reparsed,
            json!({"sections": [{"title": "Divulgación", "mapping": "Campo", "id": "d1"}]})
        );
    }

    #[test]
    fn malformed_json_is_reported() {
        let result = parse(Path::new("bad.json"), "{\"title\": ", Syntax::Json);
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }
}
