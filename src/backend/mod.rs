mod filter;
mod http;
#[cfg(test)]
pub(crate) mod memory;

use std::future::Future;

use crate::{
    error::Result,
    model::{
        Article, ArticleDraft, Category, CategoryDraft, Comment, CommentDraft, ImageUpload,
        UploadedImage,
    },
};

pub use self::{filter::ArticleFilter, http::HttpBackend};

/// 博客后端的 REST 接口
///
/// 页面只通过这个 trait 访问后端，每个方法对应一次 HTTP 请求。
pub trait Backend: Send + Sync {
    /// `GET /api/articles`
    fn articles(&self, filter: &ArticleFilter) -> impl Future<Output = Result<Vec<Article>>> + Send;

    /// `GET /api/articles/{id}`
    ///
    /// 文章不存在时返回 `None`。
    fn article(&self, id: &str) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// `POST /api/articles`
    fn create_article(&self, draft: &ArticleDraft) -> impl Future<Output = Result<Article>> + Send;

    /// `PUT /api/articles/{id}`
    fn update_article(
        &self,
        id: &str,
        draft: &ArticleDraft,
    ) -> impl Future<Output = Result<Article>> + Send;

    /// `DELETE /api/articles/{id}`
    fn delete_article(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// `GET /api/categories`
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send;

    /// `POST /api/categories`
    fn create_category(
        &self,
        draft: &CategoryDraft,
    ) -> impl Future<Output = Result<Category>> + Send;

    /// `DELETE /api/categories/{id}`
    fn delete_category(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// `GET /api/comments/{article_id}`，`approved_only` 为真时只返回已审核评论
    fn comments(
        &self,
        article_id: &str,
        approved_only: bool,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// `POST /api/comments`
    fn create_comment(&self, draft: &CommentDraft) -> impl Future<Output = Result<Comment>> + Send;

    /// `PUT /api/comments/{id}/approve`
    fn approve_comment(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// `DELETE /api/comments/{id}`
    fn delete_comment(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// `POST /api/upload`
    fn upload_image(&self, image: ImageUpload) -> impl Future<Output = Result<UploadedImage>> + Send;
}
