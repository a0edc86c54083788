#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn page_of(first_id: u64, count: u64) -> Value {
    let data: Vec<Value> = (first_id..first_id + count)
        .map(|id| json!({"id": id, "name": format!("record {id}")}))
        .collect();
    json!({ "data": data })
}

// later pages fall through to wiremock's 404
pub async fn mount_pages(server: &MockServer, route: &str, pages: &[Value]) {
    for (idx, body) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("page", (idx + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(server)
            .await;
    }
}

pub async fn requested_pages(server: &MockServer) -> Vec<u32> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
        })
        .collect()
}
