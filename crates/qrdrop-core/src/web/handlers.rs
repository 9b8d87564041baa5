//! Request classification and the range-aware file responder.

use std::io::SeekFrom;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, response::Builder, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};
use tokio_util::io::ReaderStream;

use crate::file::ServedFile;
use crate::transfer::{ProgressStream, TransferSession};

use super::range::{requested_start, ServeRange};
use super::{AppState, WebServerConfig};

/// What to do with an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Browser asking for a site icon; never touches the file
    FaviconProbe,
    /// Neither GET nor HEAD
    MethodNotAllowed,
    /// Embedded browser that cannot save downloads
    InAppBrowser,
    /// Headers only
    Head,
    /// Actual download
    Download,
}

/// Sort a request into one of the [`RequestKind`]s.
pub fn classify(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    config: &WebServerConfig,
) -> RequestKind {
    if path.contains("favicon") {
        return RequestKind::FaviconProbe;
    }
    if *method != Method::GET && *method != Method::HEAD {
        return RequestKind::MethodNotAllowed;
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if config.is_in_app_browser(user_agent) {
        return RequestKind::InAppBrowser;
    }

    if *method == Method::HEAD {
        RequestKind::Head
    } else {
        RequestKind::Download
    }
}

/// Fallback handler answering every request.
pub async fn serve(State(state): State<AppState>, request: Request) -> Response {
    let remote = remote_addr(&request);
    let kind = classify(
        request.method(),
        request.uri().path(),
        request.headers(),
        &state.config,
    );

    match kind {
        RequestKind::FaviconProbe => StatusCode::NOT_FOUND.into_response(),
        RequestKind::MethodNotAllowed => {
            (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, HEAD")]).into_response()
        }
        RequestKind::InAppBrowser => {
            tracing::debug!("In-app browser from {remote}, sending hint page");
            in_app_page(&state.file)
        }
        RequestKind::Head => {
            let range = select_range(request.headers(), &state.file);
            tracing::debug!("HEAD from {remote}");
            build(file_headers(&state.file, &range), Body::empty())
        }
        RequestKind::Download => {
            let range = select_range(request.headers(), &state.file);
            respond_file(&state, &range, remote).await
        }
    }
}

fn remote_addr(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.to_string())
}

fn select_range(headers: &HeaderMap, file: &ServedFile) -> ServeRange {
    let last_modified = file.last_modified();
    ServeRange::resolve(requested_start(headers, last_modified.as_deref()), file.size)
}

/// Stream `range` of the shared file to the client.
async fn respond_file(state: &AppState, range: &ServeRange, remote: String) -> Response {
    let file = &state.file;

    if let ServeRange::Unsatisfiable { .. } = range {
        tracing::debug!("Unsatisfiable range from {remote} for {} bytes", file.size);
        return build(file_headers(file, range), Body::empty());
    }

    let source = match open_at(file, range).await {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("Failed to open {}: {e}", file.path.display());
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to read file").into_response();
        }
    };

    let session = TransferSession::new(remote, file, range.start());
    state.observer.on_start(&session);

    let chunks = ReaderStream::with_capacity(source, state.config.stream_buffer_size);
    let body = ProgressStream::new(chunks, session, state.observer.clone());
    build(file_headers(file, range), Body::from_stream(body))
}

/// Open the file positioned at `range`, limited to the bytes it covers.
async fn open_at(file: &ServedFile, range: &ServeRange) -> std::io::Result<Take<File>> {
    let mut source = File::open(&file.path).await?;
    if range.start() > 0 {
        source.seek(SeekFrom::Start(range.start())).await?;
    }
    Ok(source.take(range.len()))
}

fn file_headers(file: &ServedFile, range: &ServeRange) -> Builder {
    let mut builder = Response::builder()
        .status(range.status())
        .header(header::ACCEPT_RANGES, "bytes");

    if let Some(content_range) = range.content_range() {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }
    if let Some(modified) = file.last_modified() {
        builder = builder.header(header::LAST_MODIFIED, modified);
    }
    if matches!(range, ServeRange::Unsatisfiable { .. }) {
        return builder.header(header::CONTENT_LENGTH, 0);
    }

    builder
        .header(header::CONTENT_TYPE, file.content_type())
        .header(header::CONTENT_DISPOSITION, file.content_disposition())
        .header(header::CONTENT_LENGTH, range.len())
}

fn in_app_page(file: &ServedFile) -> Response {
    let name = escape_html(&file.name);
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{name}</title>\n</head>\n<body>\n\
         <h1>Open this page in your browser</h1>\n\
         <p>This app cannot save downloads. Use the menu (usually at the top right) \
         and choose \"Open in browser\" to download <strong>{name}</strong>.</p>\n\
         </body>\n</html>\n"
    );

    build(
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8"),
        Body::from(page),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn build(builder: Builder, body: Body) -> Response {
    builder.body(body).unwrap_or_else(|e| {
        tracing::error!("Failed to build response: {e}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
