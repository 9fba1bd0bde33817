use std::path::Path;
use std::process::{Command, Output};

fn docbabel_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docbabel"));
    cmd.current_dir(dir);
    cmd.env_remove("RUST_LOG");
    return cmd;
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

const CODELIST: &str = "\
Code,Title,Description
open,\" Open \",\" All interested suppliers may submit a tender. \"
";

const CODELIST_CATALOG: &str = r#"{
  "Code": "Código",
  "Title": "Título",
  "Description": "Descripción",
  "Open": "Abierta",
  "All interested suppliers may submit a tender.": "Todos los proveedores interesados pueden enviar una propuesta."
}"#;

#[test]
fn translates_codelist_into_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".docbabel.toml", "headers = [\"Title\", \"Description\"]\n");
    write(dir.path(), "codelists/method.csv", CODELIST);
    write(dir.path(), "locale/es/LC_MESSAGES/codelists.json", CODELIST_CATALOG);

    let output = docbabel_cmd(dir.path())
        .args(["translate", "--domain", "codelists", "--language", "es", "--output", "build/es"])
        .arg("codelists/method.csv")
        .output()
        .unwrap();
    assert_success(&output, "translate");

    let translated = std::fs::read_to_string(dir.path().join("build/es/method.csv")).unwrap();
    assert_eq!(
        translated,
        "Código,Título,Descripción\n\
         open,Abierta,Todos los proveedores interesados pueden enviar una propuesta.\n"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Translating to es using \"codelists\" domain, into build/es"), "{stderr}");
}

#[test]
fn translates_schema_with_replacements() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "schema/release-schema.json",
        r#"{"title": "Schema {{version}}", "oneOf": [{"title": "  Linked releases  ", "type": "object"}]}"#,
    );
    write(
        dir.path(),
        "locale/es/LC_MESSAGES/schema.json",
        r#"{"Schema {{version}}": "Esquema {{version}}", "Linked releases": "Entregas vinculadas"}"#,
    );

    let output = docbabel_cmd(dir.path())
        .args(["translate", "-d", "schema", "-l", "es", "-o", "out", "--replace", "version=1.1"])
        .arg("schema/release-schema.json")
        .output()
        .unwrap();
    assert_success(&output, "translate");

    let translated = std::fs::read_to_string(dir.path().join("out/release-schema.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&translated).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "title": "Esquema 1.1",
            "oneOf": [{"title": "Entregas vinculadas", "type": "object"}]
        })
    );
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["title", "oneOf"]);
}

#[test]
fn build_runs_configured_batches() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        ".docbabel.toml",
        "\
[[batch]]
domain = \"extension\"
sources = [\"extension.json\"]
output = \"build\"

[[batch]]
domain = \"docs\"
sources = [\"docs\"]
output = \"build\"
",
    );
    write(dir.path(), "extension.json", r#"{"name": "Lots", "description": "Hello", "compatibility": ["1.1"]}"#);
    write(dir.path(), "docs/index.md", "# Hello\n\nPlain text stays.\n");
    write(dir.path(), "locale/es/LC_MESSAGES/extension.json", r#"{"Lots": "Lotes", "Hello": "Hola"}"#);
    write(dir.path(), "locale/es/LC_MESSAGES/docs.json", r#"{"Hello": "Hola"}"#);

    let output = docbabel_cmd(dir.path()).args(["build", "--language", "es"]).output().unwrap();
    assert_success(&output, "build");

    let metadata = std::fs::read_to_string(dir.path().join("build/es/extension.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&metadata).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "name": {"es": "Lotes"},
            "description": {"es": "Hola"},
            "compatibility": ["1.1"]
        })
    );

    let markdown = std::fs::read_to_string(dir.path().join("build/es/index.md")).unwrap();
    assert!(markdown.starts_with("# Hola\n"), "{markdown}");
}

#[test]
fn extract_writes_template_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".docbabel.toml", "headers = [\"Title\", \"Description\"]\n");
    write(dir.path(), "codelists/method.csv", CODELIST);

    let output = docbabel_cmd(dir.path()).args(["extract", "codelists"]).output().unwrap();
    assert_success(&output, "extract");

    let pot = String::from_utf8_lossy(&output.stdout);
    assert!(pot.starts_with("msgid \"\"\nmsgstr \"\"\n"), "{pot}");
    assert!(pot.contains("msgid \"Code\"\n"));
    assert!(pot.contains("#. Title\n"));
    assert!(pot.contains("msgid \"Open\"\n"));
    assert!(pot.contains("msgid \"All interested suppliers may submit a tender.\"\n"));
    assert!(!pot.contains("msgid \"open\""));
}

#[test]
fn extract_writes_template_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "schema.json", r#"{"title": "Releases", "properties": {"id": {"description": "Identifier"}}}"#);

    let output = docbabel_cmd(dir.path())
        .args(["extract", "--output", "locale/schema.pot", "schema.json"])
        .output()
        .unwrap();
    assert_success(&output, "extract");

    let pot = std::fs::read_to_string(dir.path().join("locale/schema.pot")).unwrap();
    assert!(pot.contains("#. /title\n#: schema.json:1\nmsgid \"Releases\"\n"), "{pot}");
    assert!(pot.contains("#. /properties/id/description\n"), "{pot}");
}

#[test]
fn unsupported_format_fails_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "notes.txt", "hello");

    let output = docbabel_cmd(dir.path()).args(["extract", "notes.txt"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported Format"), "{stderr}");
    assert!(stderr.contains("notes.txt"), "{stderr}");
}

#[test]
fn unknown_markdown_directive_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "docs/index.md", "# Title\n\n```{glossary}\nterm\n```\n");

    let output = docbabel_cmd(dir.path())
        .args(["translate", "-d", "docs", "-l", "es", "-o", "out", "docs/index.md"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown Directive"));
    assert!(!dir.path().join("out/index.md").exists());
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".docbabel.toml", "headers = \"Title\"\n");
    write(dir.path(), "schema.json", "{}");

    let output = docbabel_cmd(dir.path()).args(["extract", "schema.json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid TOML"));
}
