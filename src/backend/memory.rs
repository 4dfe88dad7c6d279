//! 内存中的后端替身，供页面单元测试使用
//!
//! 行为与真实后端保持一致：写入分类名、按标题和正文搜索、删除文章时连带删除评论。
//! 每次调用都会记录到 [`MemoryBackend::calls`]。

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, TimeZone, Utc};
use reqwest::StatusCode;

use super::{ArticleFilter, Backend};
use crate::{
    error::{ApiError, Result},
    model::{
        Article, ArticleDraft, Category, CategoryDraft, Comment, CommentDraft, ImageUpload,
        UploadedImage,
    },
};

#[derive(Default)]
struct State {
    articles: Vec<Article>,
    categories: Vec<Category>,
    comments: Vec<Comment>,
    calls: Vec<String>,
    offline: bool,
    next_id: usize,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn tick(&self) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap() + Duration::minutes(self.next_id as i64)
    }

    fn category_name(&self, id: &str) -> Option<String> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// 记录调用；离线时返回 503
    fn call(&self, call: String) -> Result<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.offline {
            return Err(ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                detail: "offline".to_string(),
            }
            .into());
        }
        Ok(state)
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn add_category(&self, id: &str, name: &str) -> Category {
        let mut state = self.lock();
        let category = Category {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{} description", name),
            color: "#007FFF".to_string(),
            created_at: None,
        };
        state.categories.push(category.clone());
        category
    }

    pub fn add_article(&self, id: &str, title: &str, category_id: &str, published: bool) -> Article {
        let mut state = self.lock();
        state.next_id += 1;
        let article = Article {
            id: id.to_string(),
            title: title.to_string(),
            content: format!("<p>{}</p>", title),
            author: "Rédaction".to_string(),
            category_id: category_id.to_string(),
            category_name: state.category_name(category_id),
            image_url: None,
            published,
            created_at: state.tick(),
            updated_at: None,
        };
        state.articles.push(article.clone());
        article
    }

    pub fn add_comment(&self, id: &str, article_id: &str, author: &str, approved: bool) -> Comment {
        let mut state = self.lock();
        state.next_id += 1;
        let comment = Comment {
            id: id.to_string(),
            article_id: article_id.to_string(),
            author: author.to_string(),
            content: format!("commentaire de {}", author),
            approved,
            created_at: state.tick(),
        };
        state.comments.push(comment.clone());
        comment
    }

    pub fn comment(&self, id: &str) -> Option<Comment> {
        self.lock().comments.iter().find(|c| c.id == id).cloned()
    }

    pub fn article_count(&self) -> usize {
        self.lock().articles.len()
    }

    pub fn category_count(&self) -> usize {
        self.lock().categories.len()
    }
}

impl Backend for MemoryBackend {
    async fn articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let state = self.call(format!("GET /articles {:?}", filter))?;

        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut articles: Vec<Article> = state
            .articles
            .iter()
            .filter(|a| !filter.published_only || a.published)
            .filter(|a| filter.category_id.as_deref().is_none_or(|id| a.category_id == id))
            .filter(|a| {
                needle.as_deref().is_none_or(|n| {
                    a.title.to_lowercase().contains(n) || a.content.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(articles)
    }

    async fn article(&self, id: &str) -> Result<Option<Article>> {
        let state = self.call(format!("GET /articles/{}", id))?;
        Ok(state.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article> {
        let mut state = self.call("POST /articles".to_string())?;
        let article = Article {
            id: state.next_id("a"),
            title: draft.title.clone(),
            content: draft.content.clone(),
            author: draft.author.clone(),
            category_id: draft.category_id.clone(),
            category_name: state.category_name(&draft.category_id),
            image_url: Some(draft.image_url.clone()),
            published: draft.published,
            created_at: state.tick(),
            updated_at: None,
        };
        state.articles.push(article.clone());
        Ok(article)
    }

    async fn update_article(&self, id: &str, draft: &ArticleDraft) -> Result<Article> {
        let mut state = self.call(format!("PUT /articles/{}", id))?;
        let category_name = state.category_name(&draft.category_id);
        let updated_at = state.tick();
        let article = state
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ApiError::NotFound)?;

        article.title = draft.title.clone();
        article.content = draft.content.clone();
        article.author = draft.author.clone();
        article.category_id = draft.category_id.clone();
        article.category_name = category_name;
        article.image_url = Some(draft.image_url.clone());
        article.published = draft.published;
        article.updated_at = Some(updated_at);
        Ok(article.clone())
    }

    async fn delete_article(&self, id: &str) -> Result<()> {
        let mut state = self.call(format!("DELETE /articles/{}", id))?;
        let before = state.articles.len();
        state.articles.retain(|a| a.id != id);
        if state.articles.len() == before {
            return Err(ApiError::NotFound.into());
        }
        state.comments.retain(|c| c.article_id != id);
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let state = self.call("GET /categories".to_string())?;
        Ok(state.categories.clone())
    }

    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category> {
        let mut state = self.call("POST /categories".to_string())?;
        let category = Category {
            id: state.next_id("c"),
            name: draft.name.clone(),
            description: draft.description.clone(),
            color: draft.color.clone(),
            created_at: None,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        let mut state = self.call(format!("DELETE /categories/{}", id))?;
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Err(ApiError::NotFound.into());
        }
        Ok(())
    }

    async fn comments(&self, article_id: &str, approved_only: bool) -> Result<Vec<Comment>> {
        let state = self.call(format!("GET /comments/{} approved_only={}", article_id, approved_only))?;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .filter(|c| !approved_only || c.approved)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn create_comment(&self, draft: &CommentDraft) -> Result<Comment> {
        let mut state = self.call("POST /comments".to_string())?;
        let comment = Comment {
            id: state.next_id("m"),
            article_id: draft.article_id.clone(),
            author: draft.author.clone(),
            content: draft.content.clone(),
            approved: false,
            created_at: state.tick(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn approve_comment(&self, id: &str) -> Result<()> {
        let mut state = self.call(format!("PUT /comments/{}/approve", id))?;
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ApiError::NotFound)?;
        comment.approved = true;
        Ok(())
    }

    async fn delete_comment(&self, id: &str) -> Result<()> {
        let mut state = self.call(format!("DELETE /comments/{}", id))?;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        if state.comments.len() == before {
            return Err(ApiError::NotFound.into());
        }
        Ok(())
    }

    async fn upload_image(&self, image: ImageUpload) -> Result<UploadedImage> {
        let mut state = self.call("POST /upload".to_string())?;
        if !image.content_type.starts_with("image/") {
            return Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                detail: "Le fichier doit être une image".to_string(),
            }
            .into());
        }
        let extension = image.file_name.rsplit('.').next().unwrap_or("bin");
        let name = state.next_id("img");
        Ok(UploadedImage {
            url: format!("/api/uploads/{}.{}", name, extension),
        })
    }
}
