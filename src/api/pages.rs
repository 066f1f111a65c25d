//! HTML pages. Templates are compiled into the binary.

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../templates/dashboard.html"))
}

pub async fn about() -> Html<&'static str> {
    Html(include_str!("../../templates/about.html"))
}
