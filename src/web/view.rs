use askama::Template;
use chrono::{DateTime, Local, Locale, Utc};

use crate::{
    backend::Backend,
    config::Site,
    model::{Article, Comment},
    pages::{
        AdminPage, ArticleForm, ArticlePage, CategoryForm, CommentForm, HomePage, HomeView, Toast,
    },
};

const EXCERPT_CHARS: usize = 150;

/// 日期，例如 `15 mars 2024`
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local)
        .format_localized("%-d %B %Y", Locale::fr_FR)
        .to_string()
}

/// 日期和时间，例如 `15 mars 2024 à 14:30`
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local)
        .format_localized("%-d %B %Y à %H:%M", Locale::fr_FR)
        .to_string()
}

/// 后台列表中的短日期，例如 `15/03/2024`
pub fn format_short_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%d/%m/%Y").to_string()
}

/// 相对地址拼接到后端源地址上，绝对地址原样返回
pub fn resolve_asset(origin: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
        url.to_string()
    } else {
        format!("{}{}", origin, url)
    }
}

/// 去掉 HTML 标签后截取正文开头作为摘要
pub fn excerpt(html: &str, limit: usize) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut summary: String = text.chars().take(limit).collect();
    summary.push_str("...");
    summary
}

// ---- 首页 ----

pub struct CategoryChip<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub color: &'a str,
    pub selected: bool,
}

pub struct ArticleCard<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    pub category_name: &'a str,
    pub date: String,
    pub excerpt: String,
    pub image: Option<String>,
}

impl<'a> ArticleCard<'a> {
    fn new(article: &'a Article, origin: &str) -> Self {
        Self {
            id: &article.id,
            title: &article.title,
            author: &article.author,
            category_name: article.category_name.as_deref().unwrap_or_default(),
            date: format_date(&article.created_at),
            excerpt: excerpt(&article.content, EXCERPT_CHARS),
            image: article.image().map(|url| resolve_asset(origin, url)),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate<'a> {
    pub site: &'a Site,
    pub toasts: &'a [Toast],
    pub search: &'a str,
    pub current_category: &'a str,
    pub all_selected: bool,
    pub categories: Vec<CategoryChip<'a>>,
    pub loading: bool,
    pub cards: Vec<ArticleCard<'a>>,
}

impl<'a> HomeTemplate<'a> {
    pub fn new<B: Backend>(site: &'a Site, page: &'a HomePage<B>, origin: &str) -> Self {
        let (loading, articles): (bool, &[Article]) = match page.view() {
            HomeView::Loading => (true, &[]),
            HomeView::Empty => (false, &[]),
            HomeView::Articles(articles) => (false, articles),
        };

        Self {
            site,
            toasts: page.toasts().as_slice(),
            search: page.search(),
            current_category: page.selected_category().unwrap_or_default(),
            all_selected: page.is_selected(None),
            categories: page
                .categories()
                .iter()
                .map(|c| CategoryChip {
                    id: &c.id,
                    name: &c.name,
                    color: &c.color,
                    selected: page.is_selected(Some(&c.id)),
                })
                .collect(),
            loading,
            cards: articles
                .iter()
                .map(|a| ArticleCard::new(a, origin))
                .collect(),
        }
    }
}

// ---- 文章页 ----

pub struct CommentView<'a> {
    pub author: &'a str,
    pub content: &'a str,
    pub date: String,
}

impl<'a> CommentView<'a> {
    fn new(comment: &'a Comment) -> Self {
        Self {
            author: &comment.author,
            content: &comment.content,
            date: format_datetime(&comment.created_at),
        }
    }
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate<'a> {
    pub site: &'a Site,
    pub toasts: &'a [Toast],
    pub id: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    pub category_name: &'a str,
    pub date: String,
    /// 文章正文是后台编辑的 HTML，原样输出
    pub content: &'a str,
    pub image: Option<String>,
    pub comments: Vec<CommentView<'a>>,
    pub form: &'a CommentForm,
}

impl<'a> ArticleTemplate<'a> {
    pub fn new<B: Backend>(
        site: &'a Site,
        page: &'a ArticlePage<B>,
        article: &'a Article,
        origin: &str,
    ) -> Self {
        Self {
            site,
            toasts: page.toasts().as_slice(),
            id: &article.id,
            title: &article.title,
            author: &article.author,
            category_name: article.category_name.as_deref().unwrap_or_default(),
            date: format_datetime(&article.created_at),
            content: &article.content,
            image: article.image().map(|url| resolve_asset(origin, url)),
            comments: page.comments().iter().map(CommentView::new).collect(),
            form: page.form(),
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub site: &'a Site,
    pub toasts: &'a [Toast],
}

// ---- 后台 ----

pub struct AdminArticleRow<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    pub category_name: &'a str,
    pub published: bool,
    pub date: String,
}

pub struct CategoryCard<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub color: &'a str,
    pub initial: String,
}

pub struct ModerationRow<'a> {
    pub id: &'a str,
    pub author: &'a str,
    pub content: &'a str,
    pub approved: bool,
    pub article_title: &'a str,
    pub date: String,
}

pub struct CategoryOption<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub selected: bool,
}

/// 文章编辑对话框
pub struct ArticleDialog<'a> {
    pub form: &'a ArticleForm,
    /// 编辑中的文章 id，新建时为空
    pub editing: &'a str,
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub options: Vec<CategoryOption<'a>>,
    pub preview: Option<String>,
    pub uploading: bool,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate<'a> {
    pub site: &'a Site,
    pub toasts: &'a [Toast],
    pub tab: &'static str,
    pub articles: Vec<AdminArticleRow<'a>>,
    pub categories: Vec<CategoryCard<'a>>,
    pub comments: Vec<ModerationRow<'a>>,
    pub pending_count: usize,
    pub article_dialog: Option<ArticleDialog<'a>>,
    pub category_dialog: Option<&'a CategoryForm>,
}

impl<'a> AdminTemplate<'a> {
    pub fn new<B: Backend>(site: &'a Site, page: &'a AdminPage<B>, origin: &str) -> Self {
        let article_dialog = page.is_article_dialog_open().then(|| {
            let form = page.article_form();
            let editing = page.editing().unwrap_or_default();
            ArticleDialog {
                form,
                editing,
                heading: if editing.is_empty() {
                    "Nouvel article"
                } else {
                    "Modifier l'article"
                },
                submit_label: if editing.is_empty() {
                    "Créer"
                } else {
                    "Mettre à jour"
                },
                options: page
                    .categories()
                    .iter()
                    .map(|c| CategoryOption {
                        id: &c.id,
                        name: &c.name,
                        selected: c.id == form.category_id,
                    })
                    .collect(),
                preview: Some(form.image_url.as_str())
                    .filter(|url| !url.is_empty())
                    .map(|url| resolve_asset(origin, url)),
                uploading: page.is_uploading_image(),
            }
        });

        Self {
            site,
            toasts: page.toasts().as_slice(),
            tab: page.tab().as_str(),
            articles: page
                .articles()
                .iter()
                .map(|a| AdminArticleRow {
                    id: &a.id,
                    title: &a.title,
                    author: &a.author,
                    category_name: a.category_name.as_deref().unwrap_or_default(),
                    published: a.published,
                    date: format_short_date(&a.created_at),
                })
                .collect(),
            categories: page
                .categories()
                .iter()
                .map(|c| CategoryCard {
                    id: &c.id,
                    name: &c.name,
                    description: &c.description,
                    color: &c.color,
                    initial: c.name.chars().next().map(String::from).unwrap_or_default(),
                })
                .collect(),
            comments: page
                .comments()
                .iter()
                .map(|c| ModerationRow {
                    id: &c.comment.id,
                    author: &c.comment.author,
                    content: &c.comment.content,
                    approved: c.comment.approved,
                    article_title: &c.article_title,
                    date: format_short_date(&c.comment.created_at),
                })
                .collect(),
            pending_count: page.pending_comments().count(),
            article_dialog,
            category_dialog: page
                .is_category_dialog_open()
                .then(|| page.category_form()),
        }
    }
}

/// 删除前的确认页
#[derive(Template)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate<'a> {
    pub site: &'a Site,
    pub toasts: &'a [Toast],
    pub message: &'a str,
    pub action: String,
    pub cancel: String,
}
