use super::*;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use shared::{
    domain::NoticeLevel,
    error::{ApiError, ErrorCode},
    protocol::{AnalyzeResponse, DatasetOverview, ForecastParams, PlotDescriptor},
};
use studio_api::AnalysisLimits;
use tower::ServiceExt;

const BOUNDARY: &str = "studio-test-boundary";

const SALES: &str = "\
date,sales
2024-01-01,10
2024-02-01,12
2024-03-01,
2024-04-01,15
2024-05-01,18
";

fn test_app(max_upload_bytes: usize) -> Router {
    build_router(Arc::new(AppState::new(
        ApiContext::new(AnalysisLimits::default()),
        max_upload_bytes,
    )))
}

enum Part<'a> {
    File { filename: &'a str, contents: &'a str },
    Text { name: &'a str, value: &'a str },
}

fn multipart(parts: &[Part<'_>]) -> String {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match part {
            Part::File { filename, contents } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
                ));
                body.push_str("Content-Type: application/octet-stream\r\n\r\n");
                body.push_str(contents);
            }
            Part::Text { name, value } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                ));
                body.push_str(value);
            }
        }
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn upload_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let body = multipart(parts);
    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = test_app(1024).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn index_serves_the_page() {
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = test_app(1024).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn catalog_and_defaults_routes_work() {
    let app = test_app(1024);
    let request = Request::get("/api/plots")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let catalog: Vec<PlotDescriptor> = read_json(response).await;
    assert_eq!(catalog.len(), 5);

    let request = Request::get("/api/forecast/defaults")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let params: ForecastParams = read_json(response).await;
    assert_eq!(params, ForecastParams::default());
}

#[tokio::test]
async fn inspect_returns_overview() {
    let request = upload_request(
        "/api/inspect",
        &[Part::File {
            filename: "sales.csv",
            contents: SALES,
        }],
    );
    let response = test_app(64 * 1024).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let overview: DatasetOverview = read_json(response).await;
    assert_eq!(overview.row_count, 5);
    assert_eq!(overview.columns[1].missing, 1);
}

#[tokio::test]
async fn analyze_runs_the_pipeline() {
    let request_json = serde_json::json!({
        "date_column": "date",
        "value_column": "sales",
        "fill": "forward_fill",
        "plot": { "kind": "rolling_mean_std", "window": 3 },
        "forecast": { "periods": 2 }
    })
    .to_string();
    let request = upload_request(
        "/api/analyze",
        &[
            Part::File {
                filename: "sales.csv",
                contents: SALES,
            },
            Part::Text {
                name: "request",
                value: &request_json,
            },
        ],
    );
    let response = test_app(64 * 1024).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let analysis: AnalyzeResponse = read_json(response).await;
    assert!(analysis.figure.is_some());
    assert_eq!(analysis.forecast.expect("forecast").future.len(), 2);
    assert!(analysis
        .notices
        .iter()
        .all(|n| n.level != NoticeLevel::Error));
}

#[tokio::test]
async fn unsupported_extension_is_415() {
    let request = upload_request(
        "/api/inspect",
        &[Part::File {
            filename: "sales.txt",
            contents: SALES,
        }],
    );
    let response = test_app(64 * 1024).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::UnsupportedFormat);
}

#[tokio::test]
async fn analyze_without_request_part_is_400() {
    let request = upload_request(
        "/api/analyze",
        &[Part::File {
            filename: "sales.csv",
            contents: SALES,
        }],
    );
    let response = test_app(64 * 1024).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn invalid_plot_parameters_are_400() {
    let request_json = serde_json::json!({
        "date_column": "date",
        "value_column": "sales",
        "plot": { "kind": "rolling_mean_std", "window": 99 }
    })
    .to_string();
    let request = upload_request(
        "/api/analyze",
        &[
            Part::File {
                filename: "sales.csv",
                contents: SALES,
            },
            Part::Text {
                name: "request",
                value: &request_json,
            },
        ],
    );
    let response = test_app(64 * 1024).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let contents = "date,sales\n".to_string() + &"2024-01-01,1\n".repeat(200);
    let request = upload_request(
        "/api/inspect",
        &[Part::File {
            filename: "sales.csv",
            contents: &contents,
        }],
    );
    let response = test_app(256).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::PayloadTooLarge);
}
