use serde::Deserialize;

use crate::{
    backend::Backend,
    model::{Article, Comment, CommentDraft},
};

use super::Toasts;

/// 文章页的加载状态
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleState {
    Loading,
    Found(Article),
    /// 加载失败或文章不存在，终止状态，不会重试
    NotFound,
}

/// 评论表单
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub author: String,
    pub content: String,
}

impl CommentForm {
    fn is_complete(&self) -> bool {
        !self.author.is_empty() && !self.content.is_empty()
    }
}

/// 单篇文章页：正文、已审核评论和评论表单
///
/// 提交的评论需要审核，提交成功后不会出现在当前列表中，列表也不会刷新。
pub struct ArticlePage<B> {
    backend: B,
    article_id: String,
    state: ArticleState,
    comments: Vec<Comment>,
    form: CommentForm,
    toasts: Toasts,
}

impl<B: Backend> ArticlePage<B> {
    pub fn new(backend: B, article_id: impl Into<String>) -> Self {
        Self {
            backend,
            article_id: article_id.into(),
            state: ArticleState::Loading,
            comments: Vec::new(),
            form: CommentForm::default(),
            toasts: Toasts::default(),
        }
    }

    /// 挂载：同时加载文章和已审核的评论
    pub async fn mount(&mut self) {
        let (article, comments) = tokio::join!(
            self.backend.article(&self.article_id),
            self.backend.comments(&self.article_id, true)
        );

        self.state = match article {
            Ok(Some(article)) => ArticleState::Found(article),
            Ok(None) => ArticleState::NotFound,
            Err(e) => {
                self.toasts
                    .failure("Erreur lors du chargement de l'article", e);
                ArticleState::NotFound
            }
        };

        match comments {
            Ok(comments) => self.comments = comments,
            Err(e) => self
                .toasts
                .failure("Erreur lors du chargement des commentaires", e),
        }
    }

    pub fn form_mut(&mut self) -> &mut CommentForm {
        &mut self.form
    }

    /// 提交评论
    ///
    /// 字段为空时只给出提示，不请求后端。成功后清空表单。
    pub async fn submit_comment(&mut self) {
        if !self.form.is_complete() {
            self.toasts.error("Veuillez remplir tous les champs");
            return;
        }

        let draft = CommentDraft {
            article_id: self.article_id.clone(),
            author: self.form.author.clone(),
            content: self.form.content.clone(),
        };

        match self.backend.create_comment(&draft).await {
            Ok(comment) => {
                tracing::info!(comment = %comment.id, article = %self.article_id, "comment submitted");
                self.form = CommentForm::default();
                self.toasts
                    .success("Commentaire envoyé! Il sera publié après modération.");
            }
            Err(e) => self
                .toasts
                .failure("Erreur lors de l'envoi du commentaire", e),
        }
    }

    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    pub fn state(&self) -> &ArticleState {
        &self.state
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn form(&self) -> &CommentForm {
        &self.form
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }
}
