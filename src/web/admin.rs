use std::sync::Arc;

use askama::Template;
use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::Html,
    routing::{get, post},
};
use axum_extra::extract::Query;
use serde::Deserialize;

use super::view::{AdminTemplate, ConfirmTemplate};
use crate::{
    backend::{Backend, HttpBackend},
    config::Site,
    error::{Error, Result},
    model::ImageUpload,
    pages::{
        AdminPage, Answers, ArticleForm, CategoryForm, Tab,
        admin::{CONFIRM_DELETE_ARTICLE, CONFIRM_DELETE_CATEGORY, CONFIRM_DELETE_COMMENT},
    },
    richtext::{Format, Selection},
    state::AppState,
};

/// 文章表单（含配图）的请求体上限
const ARTICLE_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// 配置后台路由，挂载在 `/admin` 下。
///
/// 路由包括：
/// - `GET /`：后台首页，`tab`、`edit`、`new` 控制标签页和对话框
/// - `POST /articles`：保存文章、上传配图或插入格式
/// - `GET|POST /articles/{id}/delete`：确认并删除文章
/// - `POST /categories`：新建分类
/// - `GET|POST /categories/{id}/delete`：确认并删除分类
/// - `POST /comments/{id}/approve`：审核通过评论
/// - `GET|POST /comments/{id}/delete`：确认并删除评论
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route(
            "/articles",
            post(submit_article).layer(DefaultBodyLimit::max(ARTICLE_BODY_LIMIT)),
        )
        .route(
            "/articles/{id}/delete",
            get(confirm_delete_article).post(delete_article),
        )
        .route("/categories", post(create_category))
        .route(
            "/categories/{id}/delete",
            get(confirm_delete_category).post(delete_category),
        )
        .route("/comments/{id}/approve", post(approve_comment))
        .route(
            "/comments/{id}/delete",
            get(confirm_delete_comment).post(delete_comment),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardParams {
    tab: Option<String>,
    edit: Option<String>,
    new: Option<String>,
}

/// 确认页提交的答案，只有 `confirm=yes` 才执行删除
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmParams {
    confirm: String,
}

impl ConfirmParams {
    fn answers(&self) -> Answers {
        if self.confirm == "yes" {
            Answers::confirmed()
        } else {
            Answers::declined()
        }
    }
}

/// 挂载后台页面，并切换到指定标签页
async fn mounted(backend: &HttpBackend, tab: Tab) -> AdminPage<HttpBackend> {
    let mut page = AdminPage::new(backend.clone());
    page.mount().await;
    page.set_tab(tab);
    page
}

fn render<B: Backend>(site: &Site, page: &AdminPage<B>, origin: &str) -> Result<Html<String>> {
    let html = AdminTemplate::new(site, page, origin).render()?;
    Ok(Html(html))
}

async fn dashboard(
    Query(params): Query<DashboardParams>,
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
) -> Result<Html<String>> {
    let tab = params
        .tab
        .as_deref()
        .and_then(|tab| tab.parse().ok())
        .unwrap_or_default();
    let mut page = mounted(&backend, tab).await;

    match params.new.as_deref() {
        Some("article") => {
            page.set_tab(Tab::Articles);
            page.open_new_article();
        }
        Some("category") => {
            page.set_tab(Tab::Categories);
            page.open_new_category();
        }
        _ => {}
    }

    if let Some(id) = params.edit.as_deref() {
        page.set_tab(Tab::Articles);
        if !page.edit_article(id) {
            tracing::warn!(article = id, "article to edit not found");
        }
    }

    render(&site, &page, backend.origin())
}

// ---- 文章 ----

/// 文章表单提交的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArticleAction {
    Save,
    Upload,
    Format(Format),
}

impl ArticleAction {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "" | "save" => Ok(Self::Save),
            "upload" => Ok(Self::Upload),
            _ => match s.strip_prefix("format:") {
                Some(format) => Ok(Self::Format(format.parse()?)),
                None => Err(Error::FormatError("unknown action")),
            },
        }
    }
}

/// 一次文章表单提交的全部内容
#[derive(Debug, Default)]
struct ArticleSubmission {
    form: ArticleForm,
    editing: Option<String>,
    action: String,
    selection_start: Option<usize>,
    selection_end: Option<usize>,
    link_url: Option<String>,
    image: Option<ImageUpload>,
}

impl ArticleSubmission {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;

                // 未选择文件时浏览器仍会提交一个空的文件字段
                if !file_name.is_empty() && !bytes.is_empty() {
                    submission.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "title" => submission.form.title = value,
                "content" => submission.form.content = value,
                "author" => submission.form.author = value,
                "category_id" => submission.form.category_id = value,
                "image_url" => submission.form.image_url = value,
                "published" => submission.form.published = true,
                "editing" => submission.editing = Some(value),
                "action" => submission.action = value,
                "selection_start" => submission.selection_start = value.trim().parse().ok(),
                "selection_end" => submission.selection_end = value.trim().parse().ok(),
                "link_url" => submission.link_url = Some(value),
                _ => tracing::debug!(field = %name, "ignored form field"),
            }
        }

        Ok(submission)
    }

    /// 提交时的选区，没有选区信息时视为光标在正文末尾
    fn selection(&self) -> Selection {
        match (self.selection_start, self.selection_end) {
            (Some(start), Some(end)) => Selection::new(start, end),
            (Some(at), None) | (None, Some(at)) => Selection::cursor(at),
            (None, None) => Selection::end_of(&self.form.content),
        }
    }
}

/// 文章对话框的所有按钮都提交到这里
///
/// 附带了图片时先上传，再根据 `action` 保存文章或在正文中插入格式。
async fn submit_article(
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
    multipart: Multipart,
) -> Result<Html<String>> {
    let mut submission = ArticleSubmission::read(multipart).await?;
    let action = ArticleAction::parse(&submission.action)?;
    let selection = submission.selection();

    let mut page = AdminPage::new(backend.clone());
    match action {
        ArticleAction::Save => page.mount().await,
        // 对话框保持打开，只需要分类下拉框
        ArticleAction::Upload | ArticleAction::Format(_) => page.mount_editor().await,
    }
    page.set_tab(Tab::Articles);
    page.restore_article_form(
        std::mem::take(&mut submission.form),
        submission.editing.take(),
    );

    if let Some(image) = submission.image.take() {
        page.upload_image(image).await;
    }

    match action {
        ArticleAction::Save => page.save_article().await,
        ArticleAction::Upload => {}
        ArticleAction::Format(format) => {
            let answers = Answers {
                confirmed: true,
                input: submission.link_url.take(),
            };
            page.apply_format(format, selection, &answers);
        }
    }

    render(&site, &page, backend.origin())
}

async fn confirm_delete_article(
    Path(id): Path<String>,
    State(site): State<Arc<Site>>,
) -> Result<Html<String>> {
    confirm_page(
        &site,
        CONFIRM_DELETE_ARTICLE,
        format!("/admin/articles/{}/delete", id),
        Tab::Articles,
    )
}

async fn delete_article(
    Path(id): Path<String>,
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
    Form(params): Form<ConfirmParams>,
) -> Result<Html<String>> {
    let mut page = mounted(&backend, Tab::Articles).await;
    page.delete_article(&id, &params.answers()).await;
    render(&site, &page, backend.origin())
}

// ---- 分类 ----

async fn create_category(
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
    Form(form): Form<CategoryForm>,
) -> Result<Html<String>> {
    let mut page = mounted(&backend, Tab::Categories).await;
    page.open_new_category();
    *page.category_form_mut() = form;
    page.save_category().await;
    render(&site, &page, backend.origin())
}

async fn confirm_delete_category(
    Path(id): Path<String>,
    State(site): State<Arc<Site>>,
) -> Result<Html<String>> {
    confirm_page(
        &site,
        CONFIRM_DELETE_CATEGORY,
        format!("/admin/categories/{}/delete", id),
        Tab::Categories,
    )
}

async fn delete_category(
    Path(id): Path<String>,
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
    Form(params): Form<ConfirmParams>,
) -> Result<Html<String>> {
    let mut page = mounted(&backend, Tab::Categories).await;
    page.delete_category(&id, &params.answers()).await;
    render(&site, &page, backend.origin())
}

// ---- 评论 ----

async fn approve_comment(
    Path(id): Path<String>,
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
) -> Result<Html<String>> {
    let mut page = mounted(&backend, Tab::Comments).await;
    page.approve_comment(&id).await;
    render(&site, &page, backend.origin())
}

async fn confirm_delete_comment(
    Path(id): Path<String>,
    State(site): State<Arc<Site>>,
) -> Result<Html<String>> {
    confirm_page(
        &site,
        CONFIRM_DELETE_COMMENT,
        format!("/admin/comments/{}/delete", id),
        Tab::Comments,
    )
}

async fn delete_comment(
    Path(id): Path<String>,
    State(backend): State<HttpBackend>,
    State(site): State<Arc<Site>>,
    Form(params): Form<ConfirmParams>,
) -> Result<Html<String>> {
    let mut page = mounted(&backend, Tab::Comments).await;
    page.delete_comment(&id, &params.answers()).await;
    render(&site, &page, backend.origin())
}

fn confirm_page(site: &Site, message: &str, action: String, tab: Tab) -> Result<Html<String>> {
    let html = ConfirmTemplate {
        site,
        toasts: &[],
        message,
        action,
        cancel: format!("/admin?tab={}", tab.as_str()),
    }
    .render()?;
    Ok(Html(html))
}
