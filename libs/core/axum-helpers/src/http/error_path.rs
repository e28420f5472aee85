use crate::errors::ErrorResponse;
use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Framework rejections are short; anything larger is not worth echoing.
const MAX_PLAIN_ERROR_BYTES: usize = 16 * 1024;

/// Puts every error response into the `{error, status_code, path}` envelope.
///
/// Responses built from [`ErrorResponse`] get their `path` filled in. Plain
/// text errors produced by axum itself (405, query rejections, ...) are
/// wrapped using their body as the message.
pub async fn error_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    if let Some(envelope) = response.extensions_mut().remove::<ErrorResponse>() {
        return replace_body(response, envelope.with_path(path));
    }

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let message = match to_bytes(body, MAX_PLAIN_ERROR_BYTES).await {
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    let envelope = ErrorResponse::new(status, message).with_path(path);
    replace_body(Response::from_parts(parts, Body::empty()), envelope)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

fn replace_body(response: Response, envelope: ErrorResponse) -> Response {
    let (mut parts, _) = response.into_parts();
    let (_, body) = Json(envelope).into_response().into_parts();

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, body)
}
