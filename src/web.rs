mod admin;
mod public;
pub mod view;

use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{Span, instrument};

use crate::{error::Result, state::AppState};

const STYLESHEET: &str = include_str!("../assets/app.css");

/// 设置应用的路由。
///
/// 公开页面挂在根路径下，后台挂在 `/admin` 下，并绑定应用状态。
pub fn setup_route(app: AppState) -> Router {
    Router::new()
        .merge(public::setup_route())
        .nest("/admin", admin::setup_route())
        .route("/static/app.css", get(stylesheet))
        .with_state(app)
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
///
/// 在 `listen` 上监听 TCP 连接，并打印启动日志。
#[instrument(name = "http server", skip(router))]
pub async fn run_server_with_router(router: Router, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
pub async fn run_server(app: AppState, listen: &str) -> Result<()> {
    let router = with_tracing(setup_route(app));
    run_server_with_router(router, listen).await
}

/// 每个请求一个 `page` span，响应在 debug 级别记录，5xx 在 error 级别记录。
fn with_tracing(router: Router) -> Router {
    let layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            tracing::info_span!("page", method = %req.method(), path = %req.uri().path())
        })
        .on_request(())
        .on_response(|resp: &Response, latency: Duration, _span: &Span| {
            tracing::debug!(status = %resp.status(), ?latency, "page served");
        })
        .on_failure(
            |class: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                tracing::error!(%class, ?latency, "page failed");
            },
        );

    router.layer(layer)
}
