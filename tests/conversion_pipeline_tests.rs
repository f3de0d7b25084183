//! End-to-end tests of the resolve, convert and publish pipeline.

mod common;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::time::Duration;
use tempfile::tempdir;

use common::*;
use docx_pdf_mcp_server::config::DownloadConfig;
use docx_pdf_mcp_server::mcp::content::DocumentKind;
use docx_pdf_mcp_server::mcp::conversion::ConvertRequest;

fn local_request(path: &std::path::Path) -> ConvertRequest {
    ConvertRequest {
        docx_source: Some(path.display().to_string()),
        ..Default::default()
    }
}

#[actix_web::test]
async fn test_local_docx_produces_pdf() {
    let files = tempdir().unwrap();
    let inputs = tempdir().unwrap();
    let input = inputs.path().join("Quarterly Report.docx");
    std::fs::write(&input, DOCX_BYTES).unwrap();

    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let outcome = pipeline.run(local_request(&input)).await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(
        outcome.url.as_deref(),
        Some("https://pdf.example.com/files/Quarterly%20Report.pdf")
    );

    let pdf = std::fs::read(files.path().join("Quarterly Report.pdf")).unwrap();
    assert!(!pdf.is_empty());
    assert_eq!(DocumentKind::from_bytes(&pdf), DocumentKind::Pdf);
    // Local sources are never removed.
    assert!(input.exists());
}

#[actix_web::test]
async fn test_same_input_twice_is_idempotent() {
    let files = tempdir().unwrap();
    let inputs = tempdir().unwrap();
    let input = inputs.path().join("memo.docx");
    std::fs::write(&input, DOCX_BYTES).unwrap();

    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), true),
        DownloadConfig::default(),
        fallback_only(),
    );

    let first = pipeline.run(local_request(&input)).await;
    let second = pipeline.run(local_request(&input)).await;

    assert!(first.success && second.success);
    assert_eq!(first.url, second.url);
    assert_eq!(first.pdf_base64, second.pdf_base64);

    let pdf = BASE64.decode(second.pdf_base64.unwrap()).unwrap();
    assert_eq!(DocumentKind::from_bytes(&pdf), DocumentKind::Pdf);
}

#[actix_web::test]
async fn test_concurrent_requests_do_not_interfere() {
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let request = |name: &str| ConvertRequest {
        file_base64: Some(BASE64.encode(DOCX_BYTES)),
        filename: Some(name.to_string()),
        ..Default::default()
    };

    let (a, b) = tokio::join!(pipeline.run(request("a")), pipeline.run(request("b")));
    assert!(a.success && b.success);
    assert!(files.path().join("a.pdf").exists());
    assert!(files.path().join("b.pdf").exists());
}

#[actix_web::test]
async fn test_unreachable_url_fails_cleanly() {
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig {
            timeout: Duration::from_secs(5),
            ..Default::default()
        },
        fallback_only(),
    );

    let outcome = pipeline
        .run(ConvertRequest {
            docx_source: Some("http://127.0.0.1:9/report.docx".into()),
            ..Default::default()
        })
        .await;

    assert!(!outcome.success);
    let error = outcome.error.unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("Failed to download"));
}

#[actix_web::test]
async fn test_both_converters_unavailable() {
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        no_converters(),
    );

    let outcome = pipeline
        .run(ConvertRequest {
            file_base64: Some(BASE64.encode(DOCX_BYTES)),
            ..Default::default()
        })
        .await;

    assert!(!outcome.success);
    let error = outcome.error.unwrap();
    assert!(error.contains("pandoc"));
    assert!(error.contains("libreoffice"));
    assert!(!files.path().join("output.pdf").exists());
}

#[actix_web::test]
async fn test_missing_local_file() {
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let missing = files.path().join("nope.docx");
    let outcome = pipeline.run(local_request(&missing)).await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.error.unwrap(),
        format!("File not found: {}", missing.display())
    );
}

#[actix_web::test]
async fn test_no_source_given() {
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let outcome = pipeline.run(ConvertRequest::default()).await;
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().starts_with("Provide a docx_source"));
}

#[actix_web::test]
async fn test_no_delivery_channel() {
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), None, false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let outcome = pipeline
        .run(ConvertRequest {
            file_base64: Some(BASE64.encode(DOCX_BYTES)),
            ..Default::default()
        })
        .await;

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("INCLUDE_BASE64=true"));
    assert_eq!(std::fs::read_dir(files.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn test_inline_only_result() {
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), None, true),
        DownloadConfig::default(),
        fallback_only(),
    );

    let outcome = pipeline
        .run(ConvertRequest {
            file_base64: Some(BASE64.encode(DOCX_BYTES)),
            ..Default::default()
        })
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.url.as_deref(), Some(""));
    assert!(outcome.pdf_base64.is_some());
    assert!(files.path().join("output.pdf").exists());
}

#[actix_web::test]
async fn test_url_download_names_output_after_url() {
    let (base, handle) = spawn_download_server(DOCX_BYTES, None).await;
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let outcome = pipeline
        .run(ConvertRequest {
            docx_source: Some(format!("{base}/files/contract.docx")),
            ..Default::default()
        })
        .await;

    assert!(outcome.success, "{:?}", outcome.error);
    assert!(files.path().join("contract.pdf").exists());

    let not_found = pipeline
        .run(ConvertRequest {
            docx_source: Some(format!("{base}/files/missing")),
            ..Default::default()
        })
        .await;
    assert!(!not_found.success);
    assert!(not_found.error.unwrap().contains("404"));

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_attachment_id_download_uses_template_and_token() {
    let (base, handle) = spawn_download_server(DOCX_BYTES, Some("chat-api-token")).await;
    let files = tempdir().unwrap();

    let authorized = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig {
            url_template: Some(format!("{base}/files/{{id}}")),
            api_token: Some("chat-api-token".into()),
            ..Default::default()
        },
        fallback_only(),
    );

    let outcome = authorized
        .run(ConvertRequest {
            puch_file_data: Some("att-77".into()),
            ..Default::default()
        })
        .await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert!(files.path().join("att-77.pdf").exists());

    let anonymous = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig {
            url_template: Some(format!("{base}/files/{{id}}")),
            ..Default::default()
        },
        fallback_only(),
    );
    let rejected = anonymous
        .run(ConvertRequest {
            puch_file_data: Some("att-78".into()),
            ..Default::default()
        })
        .await;
    assert!(!rejected.success);
    assert!(rejected.error.unwrap().contains("401"));

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_output_path_is_copied_into_files_dir() {
    let files = tempdir().unwrap();
    let elsewhere = tempdir().unwrap();
    let output = elsewhere.path().join("out/custom.pdf");

    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let outcome = pipeline
        .run(ConvertRequest {
            file_base64: Some(BASE64.encode(DOCX_BYTES)),
            output_path: Some(output.display().to_string()),
            filename: Some("ignored.pdf".into()),
            ..Default::default()
        })
        .await;

    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(
        outcome.url.as_deref(),
        Some("https://pdf.example.com/files/custom.pdf")
    );
    assert!(output.exists());
    assert!(files.path().join("custom.pdf").exists());
}

#[actix_web::test]
async fn test_non_document_payload_fails_conversion() {
    let files = tempdir().unwrap();
    let pipeline = pipeline(
        publish_config(files.path(), Some("https://pdf.example.com"), false),
        DownloadConfig::default(),
        fallback_only(),
    );

    let outcome = pipeline
        .run(ConvertRequest {
            file_base64: Some(BASE64.encode(b"plain text, not a docx")),
            ..Default::default()
        })
        .await;

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("not a Word document"));
}
