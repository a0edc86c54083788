use serde_json::json;

use crate::paginator::{
    page_url, parse_origin, resolve_path, DiagnosticKind, PageDiagnostic, PageOutcome, StopReason,
};

fn origin() -> reqwest::Url {
    parse_origin("http://localhost:5000").unwrap()
}

#[test]
fn resolve_joins_absolute_path_to_origin() {
    let url = resolve_path(&origin(), "/api/players").unwrap();
    assert_eq!(url.as_str(), "http://localhost:5000/api/players");
}

#[test]
fn resolve_keeps_existing_query() {
    let url = resolve_path(&origin(), "/api/teams?year=2024").unwrap();
    assert_eq!(url.query(), Some("year=2024"));
}

#[test]
fn origin_must_be_http() {
    assert!(parse_origin("localhost:5000").is_err());
    assert!(parse_origin("ftp://localhost/").is_err());
    assert!(parse_origin("mailto:someone@example.com").is_err());
    assert!(parse_origin("").is_err());
}

#[test]
fn page_url_appends_page_param() {
    let base = resolve_path(&origin(), "/api/players").unwrap();
    let url = page_url(&base, "page", 1, None);
    assert_eq!(url.as_str(), "http://localhost:5000/api/players?page=1");
}

#[test]
fn page_url_preserves_other_params_in_order() {
    let base = resolve_path(&origin(), "/api/matches?after=100&teamid=7").unwrap();
    let url = page_url(&base, "page", 3, Some(("page_size", 50)));
    assert_eq!(url.query(), Some("after=100&teamid=7&page=3&page_size=50"));
}

#[test]
fn page_url_replaces_existing_page_in_place() {
    let base = resolve_path(&origin(), "/api/teams?page=9&year=2024&page=4").unwrap();
    let url = page_url(&base, "page", 2, None);
    assert_eq!(url.query(), Some("page=2&year=2024"));
}

#[test]
fn page_url_honours_custom_param_names() {
    let base = resolve_path(&origin(), "/api/players").unwrap();
    let url = page_url(&base, "p", 5, Some(("per_page", 10)));
    assert_eq!(url.query(), Some("p=5&per_page=10"));
}

#[test]
fn page_url_leaves_base_untouched() {
    let base = resolve_path(&origin(), "/api/players?x=1").unwrap();
    let _ = page_url(&base, "page", 7, None);
    assert_eq!(base.query(), Some("x=1"));
}

#[test]
fn output_formats_parse_and_infer() {
    use crate::output::{infer_format_from_path, OutputFormat};

    assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
    assert_eq!(OutputFormat::parse("ndjson"), Some(OutputFormat::Jsonl));
    assert_eq!(OutputFormat::parse("xml"), None);
    assert_eq!(infer_format_from_path("out.jsonl"), Some(OutputFormat::Jsonl));
    assert_eq!(infer_format_from_path("out.json"), Some(OutputFormat::Json));
    assert_eq!(infer_format_from_path("out.csv"), None);
}

fn sample_results() -> Vec<crate::runner::PathResult> {
    vec![
        crate::runner::PathResult {
            path: "/api/players".to_string(),
            outcome: PageOutcome {
                url: "http://localhost:5000/api/players".to_string(),
                records: vec![json!({"id": 1}), json!({"id": 2})],
                pages: 1,
                stop: StopReason::Status(404),
                diagnostics: Vec::new(),
            },
        },
        crate::runner::PathResult {
            path: "/api/teams".to_string(),
            outcome: PageOutcome {
                url: "http://localhost:5000/api/teams".to_string(),
                records: vec![json!({"id": 10, "name": "Owls"})],
                pages: 1,
                stop: StopReason::Status(404),
                diagnostics: Vec::new(),
            },
        },
    ]
}

#[test]
fn jsonl_output_flattens_records_in_order() {
    let results = sample_results();
    let records = crate::output::build_records(&results);
    let rendered = String::from_utf8(crate::output::render_jsonl(&records)).unwrap();
    let lines: Vec<_> = rendered.lines().collect();
    assert_eq!(lines, vec![r#"{"id":1}"#, r#"{"id":2}"#, r#"{"id":10,"name":"Owls"}"#]);
}

#[test]
fn json_output_groups_by_path() {
    let results = sample_results();
    let records = crate::output::build_records(&results);
    let rendered = crate::output::render_json(&records);
    let parsed: serde_json::Value = serde_json::from_slice(&rendered).unwrap();
    assert_eq!(parsed[0]["path"], "/api/players");
    assert_eq!(parsed[0]["records"].as_array().unwrap().len(), 2);
    assert_eq!(parsed[1]["stop"], "status 404");
}

#[test]
fn json_output_reports_stop_and_dropped_pages() {
    let results = vec![crate::runner::PathResult {
        path: "/api/matches".to_string(),
        outcome: PageOutcome {
            url: "http://localhost:5000/api/matches".to_string(),
            records: vec![json!({"id": 5})],
            pages: 3,
            stop: StopReason::MaxPages,
            diagnostics: vec![
                PageDiagnostic {
                    page: 1,
                    url: "http://localhost:5000/api/matches?page=1".to_string(),
                    kind: DiagnosticKind::Decode,
                    message: "missing field `data`".to_string(),
                },
                PageDiagnostic {
                    page: 3,
                    url: "http://localhost:5000/api/matches?page=3".to_string(),
                    kind: DiagnosticKind::Body,
                    message: "connection closed".to_string(),
                },
            ],
        },
    }];
    let records = crate::output::build_records(&results);
    let parsed: serde_json::Value =
        serde_json::from_slice(&crate::output::render_json(&records)).unwrap();
    assert_eq!(parsed[0]["pages"], 3);
    assert_eq!(parsed[0]["stop"], "page limit");
    assert_eq!(parsed[0]["dropped_pages"], json!([1, 3]));
    assert_eq!(parsed[1], serde_json::Value::Null);
}

#[test]
fn text_output_has_a_header_per_path() {
    let results = sample_results();
    let records = crate::output::build_records(&results);
    let rendered = String::from_utf8(crate::output::render_text(&records)).unwrap();
    assert!(rendered.starts_with("# /api/players (2 records)\n"));
    assert!(rendered.contains("# /api/teams (1 records)\n"));
}

#[tokio::test]
async fn load_paths_merges_file_and_list() {
    let file = std::env::temp_dir().join(format!("pagecollect-paths-{}.txt", std::process::id()));
    tokio::fs::write(&file, "# players first\n/api/players\n\n/api/matches?teamid=3\n")
        .await
        .unwrap();

    let paths = crate::runner::load_paths(
        &["/api/teams".to_string(), "/api/players".to_string()],
        Some(file.to_str().unwrap()),
    )
    .await
    .unwrap();
    let _ = tokio::fs::remove_file(&file).await;

    assert_eq!(
        paths,
        vec!["/api/teams", "/api/players", "/api/matches?teamid=3"]
    );
}

#[tokio::test]
async fn load_paths_reports_missing_file() {
    let err = crate::runner::load_paths(&[], Some("/nonexistent/pagecollect/paths.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, crate::runner::RunnerError::FileOpen { .. }));
}

#[test]
fn runner_rejects_invalid_options() {
    use crate::runner::{Options, Runner, RunnerError};

    let base = Options {
        origin: "http://localhost:5000".to_string(),
        paths: vec!["/api/players".to_string()],
        ..Options::default()
    };

    assert!(matches!(
        Runner::new(Options {
            paths: Vec::new(),
            ..base.clone()
        }),
        Err(RunnerError::NoPaths)
    ));
    assert!(matches!(
        Runner::new(Options {
            rate: 0,
            ..base.clone()
        }),
        Err(RunnerError::InvalidRate { .. })
    ));
    assert!(matches!(
        Runner::new(Options {
            max_pages: Some(0),
            ..base.clone()
        }),
        Err(RunnerError::InvalidMaxPages { .. })
    ));
    assert!(matches!(
        Runner::new(Options {
            page_param: "pa ge".to_string(),
            ..base.clone()
        }),
        Err(RunnerError::InvalidParamName { .. })
    ));
    assert!(matches!(
        Runner::new(Options {
            origin: "not a url".to_string(),
            ..base.clone()
        }),
        Err(RunnerError::Paginator(_))
    ));
    assert!(Runner::new(base).is_ok());
}
