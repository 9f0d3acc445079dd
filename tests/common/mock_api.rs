//! wiremock helpers emulating the Crowdin project API

use super::fixtures::{API_KEY, PROJECT};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Replies with a scripted sequence of JSON bodies; the last one repeats
pub struct BodySequence {
    bodies: Vec<Value>,
    calls: AtomicUsize,
}

impl BodySequence {
    pub fn new(bodies: Vec<Value>) -> Self {
        assert!(!bodies.is_empty(), "a sequence needs at least one body");
        Self {
            bodies,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for BodySequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let body = &self.bodies[call.min(self.bodies.len() - 1)];
        ResponseTemplate::new(200).set_body_json(body.clone())
    }
}

fn project_path(operation: &str) -> String {
    format!("/project/{}/{}", PROJECT, operation)
}

/// `info` answers with a valid project
pub async fn mount_project_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(project_path("info")))
        .and(query_param("key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"details": {"name": PROJECT}})),
        )
        .mount(server)
        .await;
}

/// `info` answers with an error payload
pub async fn mount_project_info_error(server: &MockServer, message: &str) {
    Mock::given(method("GET"))
        .and(path(project_path("info")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": {"code": 3, "message": message}
        })))
        .mount(server)
        .await;
}

/// `export?async=1` is accepted, expected exactly `times` times
pub async fn mount_trigger_export(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path(project_path("export")))
        .and(query_param("async", "1"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(times)
        .mount(server)
        .await;
}

/// `export-status` walks through `statuses` (`none`, `in-progress`, `finished`, or a full body)
pub async fn mount_export_status(server: &MockServer, statuses: Vec<Value>) {
    let bodies = statuses
        .into_iter()
        .map(|status| match status {
            Value::String(s) => json!({"status": s, "progress": 0}),
            other => other,
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(project_path("export-status")))
        .and(query_param("key", API_KEY))
        .respond_with(BodySequence::new(bodies))
        .mount(server)
        .await;
}

/// `download/all.zip` serves `archive`, expected exactly `times` times
pub async fn mount_download(server: &MockServer, archive: Vec<u8>, times: u64) {
    Mock::given(method("GET"))
        .and(path(project_path("download/all.zip")))
        .and(query_param("key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/zip")
                .set_body_bytes(archive),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// `update-file` answers with `status` and `body`
pub async fn mount_update_file(server: &MockServer, status: u16, body: Value, times: u64) {
    Mock::given(method("POST"))
        .and(path(project_path("update-file")))
        .and(query_param("update_option", "update_as_unapproved"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}
