use std::sync::Arc;

use axum::extract::FromRef;

use crate::{backend::HttpBackend, config::Site};

/// 应用程序上下文
///
/// [`AppState`] 封装了后端客户端和站点文案，处理函数通过 `State<HttpBackend>`、
/// `State<Arc<Site>>` 分别取用。
#[derive(Clone, FromRef)]
pub struct AppState {
    backend: HttpBackend,
    site: Arc<Site>,
}

impl AppState {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(backend: HttpBackend, site: Site) -> Self {
        Self {
            backend,
            site: Arc::new(site),
        }
    }
}
