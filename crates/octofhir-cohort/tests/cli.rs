//! Command implementations driven through files
#![cfg(feature = "cli")]

mod common;

use common::*;
use octofhir_cohort::cli::{build, check, join, unbuild};
use octofhir_cohort::{RequestBuilder, UnbuiltRequest};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn sample_document() -> String {
    RequestBuilder::new().build(&sample_request()).unwrap()
}

#[tokio::test]
async fn test_build_command() {
    let dir = TempDir::new().unwrap();
    let request = write(dir.path(), "request.json", &serde_json::to_string(&sample_request()).unwrap());
    let output = dir.path().join("query.json");

    build::build(build::BuildConfig {
        file: request,
        version: None,
        pretty: false,
        output_file: Some(output.clone()),
    })
    .await
    .unwrap();

    assert_eq!(fs::read_to_string(output).unwrap(), sample_document());
}

#[tokio::test]
async fn test_build_command_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let request = write(dir.path(), "request.json", "[1, 2");
    let result = build::build(build::BuildConfig {
        file: request,
        version: None,
        pretty: false,
        output_file: None,
    })
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unbuild_command() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "query.json", &sample_document());
    let output = dir.path().join("request.json");

    unbuild::unbuild(unbuild::UnbuildConfig {
        file: document,
        catalog: None,
        pretty: true,
        verbose: false,
        output_file: Some(output.clone()),
    })
    .await
    .unwrap();

    let unbuilt: UnbuiltRequest = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(unbuilt.request.criteria.len(), 4);
    assert_eq!(unbuilt.request.groups.len(), 2);
}

#[tokio::test]
async fn test_join_command() {
    let dir = TempDir::new().unwrap();
    let base = write(dir.path(), "base.json", &sample_document());
    let sub = write(dir.path(), "sub.json", &sample_document());
    let output = dir.path().join("joined.json");

    join::join(join::JoinConfig {
        base,
        sub,
        parent_id: -1,
        offset: None,
        catalog: None,
        pretty: false,
        verbose: false,
        output_file: Some(output.clone()),
    })
    .await
    .unwrap();

    let joined: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    let nested = &joined["request"]["criteria"][1];
    assert_eq!(nested["_id"], -1);
    assert_eq!(nested["criteria"][3]["_id"], -2);
}

#[tokio::test]
async fn test_join_command_unknown_parent() {
    let dir = TempDir::new().unwrap();
    let base = write(dir.path(), "base.json", &sample_document());
    let result = join::join(join::JoinConfig {
        base: base.clone(),
        sub: base,
        parent_id: -9,
        offset: None,
        catalog: None,
        pretty: false,
        verbose: false,
        output_file: Some(dir.path().join("joined.json")),
    })
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_check_command() {
    let dir = TempDir::new().unwrap();
    let clean = write(dir.path(), "clean.json", &sample_document());
    let config = |files: Vec<PathBuf>, strict| check::CheckConfig {
        files,
        catalog: None,
        strict,
        verbose: false,
    };

    check::check(config(vec![clean.clone()], true)).await.unwrap();

    let broken = sample_document().replace("gender=f", "gender=f&shoe-size=42");
    let broken = write(dir.path(), "broken.json", &broken);
    assert!(check::check(config(vec![clean.clone(), broken], false)).await.is_err());

    let missing = dir.path().join("missing.json");
    assert!(check::check(config(vec![missing], false)).await.is_err());
    assert!(check::check(config(Vec::new(), false)).await.is_err());
}
