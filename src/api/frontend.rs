use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Embedded frontend pages (compile-time embed from frontend/) / 嵌入前端页面
#[derive(RustEmbed)]
#[folder = "frontend/"]
struct FrontendAssets;

fn embedded(path: &str) -> Option<Response> {
    let content = FrontendAssets::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(([(header::CONTENT_TYPE, mime.as_ref().to_string())], content.data.into_owned()).into_response())
}

/// GET / - search page, behind the login guard / 搜索页
pub async fn index_page() -> Response {
    embedded("index.html").unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
}

/// Handle embedded static file requests / 处理嵌入的静态文件请求
///
/// Extensionless paths resolve to `<path>.html`, so `/login` serves `login.html`.
pub async fn serve_embedded_file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let name = if !path.is_empty() && !path.contains('.') {
        format!("{}.html", path)
    } else {
        path.to_string()
    };

    // The search page is only reachable through the guarded `/` route
    if name == "index.html" {
        return StatusCode::NOT_FOUND.into_response();
    }

    embedded(&name).unwrap_or_else(|| (StatusCode::NOT_FOUND, "Not Found").into_response())
}
