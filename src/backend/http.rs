use std::sync::Arc;

use reqwest::{
    Response, StatusCode, Url,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};

use super::{ArticleFilter, Backend};
use crate::{
    error::{ApiError, Error, Result},
    model::{
        Article, ArticleDraft, Category, CategoryDraft, Comment, CommentDraft, ImageUpload,
        UploadedImage,
    },
};

/// 基于 reqwest 的 [`Backend`] 实现
///
/// 所有接口位于 `{origin}/api` 下。克隆开销很小，内部共享同一个连接池。
///
/// 路径中的 id 逐段编码，`/`、`..` 之类的字符不会改变请求的接口。
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    origin: Arc<str>,
    api: Url,
}

impl HttpBackend {
    /// 使用后端源地址创建客户端
    ///
    /// ```ignore
    /// let backend = HttpBackend::new("http://localhost:8000")?;
    /// ```
    pub fn new(origin: impl AsRef<str>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        let origin = origin.as_ref().trim_end_matches('/');
        let api = Url::parse(&format!("{}/api", origin))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or(Error::FormatError("invalid backend url"))?;

        Ok(Self {
            client,
            api,
            origin: Arc::from(origin),
        })
    }

    /// 后端源地址，用于拼接相对的图片地址
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// 在 `/api` 后追加路径段，每段单独做百分号编码
    ///
    /// `.` 和 `..` 会被 url 解析为目录跳转，不能作为 id。
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
            return Err(Error::FormatError("invalid resource id"));
        }

        let mut url = self.api.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

/// 把非 2xx 响应转换为 [`ApiError`]
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound.into());
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { detail }) => detail,
            Err(_) => body,
        };
        return Err(ApiError::Status { status, detail }.into());
    }

    Ok(resp)
}

/// 后端错误响应体 `{"detail": "..."}`
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Serialize)]
struct CommentsQuery {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    approved_only: bool,
}

impl Backend for HttpBackend {
    async fn articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let resp = self
            .client
            .get(self.url(&["articles"])?)
            .query(filter)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn article(&self, id: &str) -> Result<Option<Article>> {
        let resp = self
            .client
            .get(self.url(&["articles", id])?)
            .send()
            .await?;

        match check(resp).await {
            Ok(resp) => Ok(Some(resp.json().await?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article> {
        let resp = self
            .client
            .post(self.url(&["articles"])?)
            .json(draft)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn update_article(&self, id: &str, draft: &ArticleDraft) -> Result<Article> {
        let resp = self
            .client
            .put(self.url(&["articles", id])?)
            .json(draft)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn delete_article(&self, id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&["articles", id])?)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let resp = self.client.get(self.url(&["categories"])?).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category> {
        let resp = self
            .client
            .post(self.url(&["categories"])?)
            .json(draft)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&["categories", id])?)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn comments(&self, article_id: &str, approved_only: bool) -> Result<Vec<Comment>> {
        let resp = self
            .client
            .get(self.url(&["comments", article_id])?)
            .query(&CommentsQuery { approved_only })
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn create_comment(&self, draft: &CommentDraft) -> Result<Comment> {
        let resp = self
            .client
            .post(self.url(&["comments"])?)
            .json(draft)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn approve_comment(&self, id: &str) -> Result<()> {
        let resp = self
            .client
            .put(self.url(&["comments", id, "approve"])?)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn delete_comment(&self, id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&["comments", id])?)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn upload_image(&self, image: ImageUpload) -> Result<UploadedImage> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;

        let resp = self
            .client
            .post(self.url(&["upload"])?)
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }
}
