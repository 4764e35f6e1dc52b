//! Common test utilities

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zonedir::directory::{CloudflareFetcher, DirectoryAssembler, HttpProber};

pub const TEST_TOKEN: &str = "test-token";

/// Successful listing payload for the given `(name, status)` pairs
pub fn zones_body(zones: &[(&str, &str)]) -> Value {
    let result: Vec<Value> = zones
        .iter()
        .enumerate()
        .map(|(i, (name, status))| {
            json!({
                "id": format!("zone-{i}"),
                "name": name,
                "status": status,
                "paused": false,
            })
        })
        .collect();

    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
    })
}

/// Mount a successful listing page
pub async fn mount_page(server: &MockServer, page: u32, zones: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(zones_body(zones)))
        .mount(server)
        .await;
}

/// Mount a failing listing page
pub async fn mount_failing_page(server: &MockServer, page: u32, status: u16) {
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mount a probe target answering HEAD with `status`
pub async fn mount_probe(server: &MockServer, zone: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(format!("/{zone}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub fn fetcher_for(server: &MockServer) -> CloudflareFetcher {
    CloudflareFetcher::with_config(&server.uri(), TEST_TOKEN, 50, Duration::from_secs(5)).unwrap()
}

pub fn prober_for(server: &MockServer) -> HttpProber {
    HttpProber::with_target_base(&server.uri(), Duration::from_secs(2)).unwrap()
}

/// Assembler using `api` for listing and `probes` for liveness
pub fn assembler_for(api: &MockServer, probes: &MockServer) -> Arc<DirectoryAssembler> {
    Arc::new(DirectoryAssembler::new(
        Arc::new(fetcher_for(api)),
        Arc::new(prober_for(probes)),
    ))
}
