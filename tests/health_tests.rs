//! Health report tests against real directories.

mod common;

use tempfile::tempdir;

use common::*;
use docx_pdf_mcp_server::config::DownloadConfig;

#[actix_web::test]
async fn test_writable_directory_reports_true() {
    let dir = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(&dir.path().join("published"), None, true),
        DownloadConfig {
            url_template: Some("https://chat.example/files/{id}".into()),
            ..Default::default()
        },
        fallback_only(),
    );

    let report = pipeline.health().await;
    assert!(report.ok);
    assert!(report.checks.files_dir.writable);
    assert!(report.checks.files_dir_error.is_none());
    assert!(!report.checks.base_url.set);
    assert_eq!(
        report.checks.download_url_template,
        "https://chat.example/files/{id}"
    );
    assert!(!report.checks.api_token_set);
    assert!(dir.path().join("published").is_dir());
}

#[actix_web::test]
async fn test_unwritable_directory_reports_false() {
    let dir = tempdir().unwrap();
    // A path below a regular file can never be created, even by root.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();

    let pipeline = pipeline(
        publish_config(&blocker.join("files"), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let report = pipeline.health().await;
    assert!(!report.ok);
    assert!(!report.checks.files_dir.writable);
    assert!(report.checks.files_dir_error.is_some());
    assert!(report.checks.base_url.set);
}

#[cfg(unix)]
#[actix_web::test]
async fn test_read_only_directory_reports_false() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let read_only = dir.path().join("ro");
    std::fs::create_dir(&read_only).unwrap();
    std::fs::set_permissions(&read_only, std::fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores permission bits, so only assert when the probe can observe them.
    let observable = std::fs::write(read_only.join("check"), b"x").is_err();

    let pipeline = pipeline(
        publish_config(&read_only, Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );
    let report = pipeline.health().await;

    if observable {
        assert!(!report.ok);
        assert!(!report.checks.files_dir.writable);
    } else {
        let _ = std::fs::remove_file(read_only.join("check"));
    }

    std::fs::set_permissions(&read_only, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[actix_web::test]
async fn test_converter_readiness_is_reported() {
    let dir = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(dir.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        no_converters(),
    );

    let report = pipeline.health().await;
    let pandoc = &report.checks.converters["pandoc"];
    let libreoffice = &report.checks.converters["libreoffice"];
    assert!(!pandoc.available);
    assert!(!libreoffice.available);
    // Converter availability does not affect the overall flag.
    assert!(report.ok);
}
