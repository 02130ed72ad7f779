use std::fs;

use oas_resolve::parse::parse_document;
use oas_resolve::serialize::{render, write_output};
use oas_resolve::types::{DocumentTree, OutputFormat};
use tempfile::TempDir;

const RESOLVED: &str = "\
openapi: 3.1.0
info:
  title: 'Pets: the API'
  version: '1.0'
servers:
  - url: https://api.example.com
paths:
  /pets/{id}:
    get:
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: integer
            minimum: 1
            maximum: 9.5
      deprecated: false
      x-empty: null
";

fn resolved_tree() -> DocumentTree {
    parse_document(RESOLVED, "resolved.yaml", false).unwrap()
}

#[test]
fn test_json_round_trip() {
    let tree = resolved_tree();
    let json = render(&tree, OutputFormat::Json).unwrap();
    let reparsed = parse_document(&json, "resolved.json", false).unwrap();
    assert_eq!(reparsed, tree);
}

#[test]
fn test_yaml_round_trip() {
    let tree = resolved_tree();
    let yaml = render(&tree, OutputFormat::Yaml).unwrap();
    let reparsed = parse_document(&yaml, "resolved.yaml", false).unwrap();
    assert_eq!(reparsed, tree);
}

#[test]
fn test_render_preserves_key_order() {
    let tree = resolved_tree();
    let yaml = render(&tree, OutputFormat::Yaml).unwrap();
    let openapi = yaml.find("openapi").unwrap();
    let info = yaml.find("info").unwrap();
    let paths = yaml.find("paths").unwrap();
    assert!(openapi < info && info < paths);
}

#[test]
fn test_write_output_json() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.json");
    write_output(&resolved_tree(), OutputFormat::Json, &out).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["info"]["title"], "Pets: the API");
    assert!(written.starts_with("{\n  \"openapi\""));
}

#[test]
fn test_non_string_keys_cannot_be_json() {
    let tree: DocumentTree = serde_yaml::from_str("? [1, 2]\n: pair\n").unwrap();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.json");

    let err = write_output(&tree, OutputFormat::Json, &out).unwrap_err();
    assert!(err.to_string().contains(&out.display().to_string()));
    assert!(!out.exists());
}
