use super::*;

#[test]
fn error_codes_map_to_http_statuses() {
    assert_eq!(status_for(ErrorCode::Validation), StatusCode::BAD_REQUEST);
    assert_eq!(
        status_for(ErrorCode::UnsupportedFormat),
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    );
    assert_eq!(
        status_for(ErrorCode::PayloadTooLarge),
        StatusCode::PAYLOAD_TOO_LARGE
    );
    assert_eq!(
        status_for(ErrorCode::Internal),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn reject_keeps_the_error_body() {
    let (status, Json(body)) = reject(ApiError::validation("bad window"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.message, "bad window");
}

#[tokio::test]
async fn blocking_jobs_return_their_result() {
    let value = run_blocking(|| Ok::<_, ApiError>(42)).await.expect("value");
    assert_eq!(value, 42);
    let err = run_blocking(|| Err::<(), _>(ApiError::validation("nope")))
        .await
        .expect_err("error");
    assert_eq!(err.code, ErrorCode::Validation);
}
