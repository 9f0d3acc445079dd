//! Source catalog upload

use crate::client::RemoteClient;
use crate::config::SyncOptions;
use crate::error::Result;
use crate::reporter::StatusSink;
use std::path::PathBuf;
use tracing::info;

/// Progress label shown while the upload runs
pub const UPLOADING_NOTICE: &str = "Uploading source file...";

/// Multipart field name the API expects for a remote file
pub fn upload_field_name(remote_file_name: &str) -> String {
    format!("files[{}]", remote_file_name)
}

/// Stream the local source catalog to the remote file named in `options`
///
/// A missing local file fails with a not-found I/O error before any request is
/// made. Returns the uploaded path; confirming success to the user is up to the
/// caller.
pub async fn upload_source_catalog(
    client: &RemoteClient,
    options: &SyncOptions,
    sink: &dyn StatusSink,
) -> Result<PathBuf> {
    let path = options.source_catalog_path();
    let file = tokio::fs::File::open(&path).await?;

    sink.start_progress(UPLOADING_NOTICE);
    let result = client
        .upload_file(
            &upload_field_name(&options.remote_file_name),
            &options.translations_file,
            file,
        )
        .await;
    sink.stop_progress();
    result?;

    info!(?path, remote_file = %options.remote_file_name, "source catalog uploaded");
    Ok(path)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::reporter::{MemorySink, SinkEvent};
    use crate::test_helpers::test_options;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_upload_field_name() {
        assert_eq!(upload_field_name("messages.pot"), "files[messages.pot]");
    }

    #[tokio::test]
    async fn test_upload_streams_file_as_multipart_field() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/project/test-project/update-file"))
            .and(query_param("update_option", "update_as_unapproved"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let options = test_options(&mock_server.uri(), temp_dir.path());
        std::fs::create_dir_all(&options.translations_dir).unwrap();
        std::fs::write(options.source_catalog_path(), b"msgid \"Hello\"\nmsgstr \"\"\n").unwrap();

        let client = RemoteClient::new(&options).unwrap();
        let sink = MemorySink::new();
        let uploaded = upload_source_catalog(&client, &options, &sink).await.unwrap();
        assert_eq!(uploaded, options.source_catalog_path());

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"files[messages.pot]\""));
        assert!(body.contains("filename=\"messages.pot\""));
        assert!(body.contains("msgid \"Hello\""));

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::StartProgress(UPLOADING_NOTICE.into()),
                SinkEvent::StopProgress,
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_missing_file_makes_no_request() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let options = test_options(&mock_server.uri(), temp_dir.path());
        let client = RemoteClient::new(&options).unwrap();
        let sink = MemorySink::new();

        let err = upload_source_catalog(&client, &options, &sink)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejected_carries_upstream_message() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/project/test-project/update-file"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "success": false,
                "error": {"code": 8, "message": "quota exceeded"}
            })))
            .mount(&mock_server)
            .await;

        let options = test_options(&mock_server.uri(), temp_dir.path());
        std::fs::create_dir_all(&options.translations_dir).unwrap();
        std::fs::write(options.source_catalog_path(), b"msgid \"\"").unwrap();
        let client = RemoteClient::new(&options).unwrap();
        let sink = MemorySink::new();

        match upload_source_catalog(&client, &options, &sink).await {
            Err(Error::Upload(message)) => assert_eq!(message, "quota exceeded"),
            other => panic!("expected Upload error, got {:?}", other),
        }
        // Progress indicator is stopped even when the upload fails
        assert_eq!(sink.events().last(), Some(&SinkEvent::StopProgress));
    }

    #[tokio::test]
    async fn test_upload_rejected_without_structured_message() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/project/test-project/update-file"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let options = test_options(&mock_server.uri(), temp_dir.path());
        std::fs::create_dir_all(&options.translations_dir).unwrap();
        std::fs::write(options.source_catalog_path(), b"msgid \"\"").unwrap();
        let client = RemoteClient::new(&options).unwrap();

        match upload_source_catalog(&client, &options, &MemorySink::new()).await {
            Err(Error::Upload(message)) => assert_eq!(message, "HTTP 500 Internal Server Error"),
            other => panic!("expected Upload error, got {:?}", other),
        }
    }
}
