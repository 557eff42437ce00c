use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use twinscan_core::{
    ConfigError, ContentDigest, DuplicateGroup, FileError, FileErrorKind, HashMode, ScanParams,
    ScanResult, ScanStatus,
};

#[test]
fn test_params_deserialize_with_defaults() {
    let params: ScanParams = serde_json::from_str(r#"{"root": "/data"}"#).unwrap();

    assert_eq!(params.root, PathBuf::from("/data"));
    assert_eq!(params.block_size, "1024");
    assert_eq!(params.min_size, "0");
    assert_eq!(params.hash_mode, HashMode::Strong);
    assert!(params.include_hidden);
}

#[test]
fn test_params_deserialize_hash_mode() {
    let params: ScanParams =
        serde_json::from_str(r#"{"root": "/data", "hash_mode": "fast", "min_size": "4"}"#)
            .unwrap();

    assert_eq!(params.hash_mode, HashMode::Fast);
    assert_eq!(params.min_size, "4");
}

#[test]
fn test_validation_produces_canonical_root() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("sub")).unwrap();

    let params = ScanParams::new(temp.path().join("sub").join("..").join("sub"));
    let config = params.validate().unwrap();

    assert_eq!(
        config.root(),
        temp.path().join("sub").canonicalize().unwrap().as_path()
    );
}

#[test]
fn test_validation_error_messages_are_user_facing() {
    let temp = TempDir::new().unwrap();
    let params = ScanParams::builder()
        .root(temp.path())
        .min_size("lots")
        .build()
        .unwrap();

    let err = params.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMinSize { .. }));
    assert!(
        err.to_string()
            .starts_with("The min size is not a positive integer or zero")
    );
}

#[test]
fn test_scan_result_json_shape() {
    let result = ScanResult {
        groups: vec![DuplicateGroup::new(
            5,
            ContentDigest::Fast(0xdead_beef),
            vec![PathBuf::from("/t/a.txt"), PathBuf::from("/t/b.txt")],
        )],
        errors: vec![FileError::new(
            "/t/locked",
            "Permission denied: /t/locked",
            FileErrorKind::PermissionDenied,
        )],
        ignored: vec![PathBuf::from("/t/d.txt")],
        total_size: 15,
        status: ScanStatus::Completed,
        hash_mode: HashMode::Fast,
        files_scanned: 5,
        files_hashed: 3,
        scan_duration: Duration::from_millis(12),
    };

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["groups"][0]["digest"], "00000000deadbeef");
    assert_eq!(json["groups"][0]["wasted_bytes"], 5);
    assert_eq!(json["status"]["state"], "completed");
    assert_eq!(json["hash_mode"], "fast");
    assert_eq!(json["errors"][0]["kind"], "PermissionDenied");

    let back: ScanResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.groups, result.groups);
    assert_eq!(back.errors, result.errors);
    assert_eq!(back.total_size, 15);
}

#[test]
fn test_aborted_status_serializes_message() {
    let status = ScanStatus::Aborted {
        message: "Block size is too large".to_string(),
    };
    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["state"], "aborted");
    assert_eq!(json["message"], "Block size is too large");
}
