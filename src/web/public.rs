use std::sync::Arc;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::Query;
use serde::Deserialize;

use super::view::{ArticleTemplate, HomeTemplate, NotFoundTemplate};
use crate::{
    backend::{Backend, HttpBackend},
    config::Site,
    error::Result,
    pages::{ArticlePage, ArticleState, CommentForm, HomePage},
    state::AppState,
};

/// 配置公开页面路由。
///
/// 路由包括：
/// - `GET /`：首页，支持分类筛选和搜索
/// - `GET /article/{id}`：单篇文章
/// - `POST /article/{id}/comments`：提交评论
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/article/{id}", get(article))
        .route("/article/{id}/comments", post(submit_comment))
}

/// 分类按钮中代表“全部”的取值
const ALL_CATEGORIES: &str = "all";

/// 首页筛选表单
///
/// `category` 为当前选中的分类，`pick` 来自被点击的分类按钮；
/// 点击“搜索”时没有 `pick`，沿用当前分类。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HomeParams {
    search: String,
    category: String,
    pick: String,
}

impl HomeParams {
    fn into_filter(self) -> (Option<String>, String) {
        let category = match self.pick.as_str() {
            "" => self.category,
            ALL_CATEGORIES => String::new(),
            _ => self.pick,
        };
        (Some(category).filter(|id| !id.is_empty()), self.search)
    }
}

async fn home(
    Query(params): Query<HomeParams>,
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
) -> Result<Html<String>> {
    let (category, search) = params.into_filter();

    let mut page = HomePage::new(backend.clone());
    page.restore(category, search);
    page.mount().await;

    let html = HomeTemplate::new(&site, &page, backend.origin()).render()?;
    Ok(Html(html))
}

async fn article(
    Path(id): Path<String>,
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
) -> Result<Response> {
    let mut page = ArticlePage::new(backend.clone(), id);
    page.mount().await;
    render_article(&site, &page, backend.origin())
}

/// 提交评论后重新渲染文章页，成功时表单清空
async fn submit_comment(
    Path(id): Path<String>,
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let mut page = ArticlePage::new(backend.clone(), id);
    page.mount().await;

    if matches!(page.state(), ArticleState::Found(_)) {
        *page.form_mut() = form;
        page.submit_comment().await;
    }

    render_article(&site, &page, backend.origin())
}

fn render_article<B: Backend>(site: &Site, page: &ArticlePage<B>, origin: &str) -> Result<Response> {
    match page.state() {
        ArticleState::Found(article) => {
            let html = ArticleTemplate::new(site, page, article, origin).render()?;
            Ok(Html(html).into_response())
        }
        ArticleState::Loading | ArticleState::NotFound => {
            let html = NotFoundTemplate {
                site,
                toasts: page.toasts().as_slice(),
            }
            .render()?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
    }
}
