use std::str::FromStr;

use futures::future::try_join_all;
use serde::Deserialize;

use crate::{
    backend::{ArticleFilter, Backend},
    error::{Error, Result},
    model::{Article, ArticleDraft, Category, CategoryDraft, ImageUpload, ModeratedComment},
    richtext::{self, Format, Markup, Selection},
};

use super::{Dialog, Toasts};

pub const CONFIRM_DELETE_ARTICLE: &str = "Êtes-vous sûr de vouloir supprimer cet article?";
pub const CONFIRM_DELETE_CATEGORY: &str = "Êtes-vous sûr de vouloir supprimer cette catégorie?";
pub const CONFIRM_DELETE_COMMENT: &str = "Êtes-vous sûr de vouloir supprimer ce commentaire?";
pub const LINK_PROMPT: &str = "URL du lien:";

const DEFAULT_CATEGORY_COLOR: &str = "#007FFF";

/// 后台的三个标签页
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Articles,
    Categories,
    Comments,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Articles => "articles",
            Tab::Categories => "categories",
            Tab::Comments => "comments",
        }
    }
}

impl FromStr for Tab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "articles" => Ok(Tab::Articles),
            "categories" => Ok(Tab::Categories),
            "comments" => Ok(Tab::Comments),
            _ => Err(Error::FormatError("unknown tab")),
        }
    }
}

/// 文章表单，新建和编辑共用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleForm {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category_id: String,
    pub image_url: String,
    pub published: bool,
}

impl ArticleForm {
    /// 复制已有文章的字段
    pub fn from_article(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            content: article.content.clone(),
            author: article.author.clone(),
            category_id: article.category_id.clone(),
            image_url: article.image_url.clone().unwrap_or_default(),
            published: article.published,
        }
    }

    /// 标题、正文、作者、分类均为必填
    fn is_complete(&self) -> bool {
        [&self.title, &self.content, &self.author, &self.category_id]
            .iter()
            .all(|field| !field.is_empty())
    }

    fn to_draft(&self) -> ArticleDraft {
        ArticleDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            author: self.author.clone(),
            category_id: self.category_id.clone(),
            image_url: self.image_url.clone(),
            published: self.published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub color: String,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
        }
    }
}

impl CategoryForm {
    fn to_draft(&self) -> CategoryDraft {
        let color = if self.color.trim().is_empty() {
            DEFAULT_CATEGORY_COLOR.to_string()
        } else {
            self.color.clone()
        };

        CategoryDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            color,
        }
    }
}

/// 一次取回所有文章的评论，并附上文章标题
///
/// 各文章的请求并发发出，结果按文章顺序拼接；任何一个失败则整体失败。
pub async fn moderation_queue<B: Backend>(
    backend: &B,
    articles: &[Article],
) -> Result<Vec<ModeratedComment>> {
    let batches = try_join_all(articles.iter().map(|a| backend.comments(&a.id, false))).await?;

    Ok(articles
        .iter()
        .zip(batches)
        .flat_map(|(article, comments)| {
            comments.into_iter().map(move |comment| ModeratedComment {
                comment,
                article_title: article.title.clone(),
            })
        })
        .collect())
}

/// 管理后台：文章和分类的增删改，评论审核
///
/// 每次写操作成功后都重新拉取对应的完整列表，不在本地合并修改结果。
pub struct AdminPage<B> {
    backend: B,
    articles: Vec<Article>,
    categories: Vec<Category>,
    comments: Vec<ModeratedComment>,
    tab: Tab,

    article_form: ArticleForm,
    editing: Option<String>,
    article_dialog_open: bool,
    uploading_image: bool,

    category_form: CategoryForm,
    category_dialog_open: bool,

    toasts: Toasts,
}

impl<B: Backend> AdminPage<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            articles: Vec::new(),
            categories: Vec::new(),
            comments: Vec::new(),
            tab: Tab::default(),
            article_form: ArticleForm::default(),
            editing: None,
            article_dialog_open: false,
            uploading_image: false,
            category_form: CategoryForm::default(),
            category_dialog_open: false,
            toasts: Toasts::default(),
        }
    }

    /// 挂载：加载文章、分类，再加载这些文章的全部评论
    pub async fn mount(&mut self) {
        let filter = ArticleFilter::all();
        let (articles, categories) = tokio::join!(
            self.backend.articles(&filter),
            self.backend.categories()
        );

        match articles {
            Ok(articles) => self.articles = articles,
            Err(e) => self
                .toasts
                .failure("Erreur lors du chargement des articles", e),
        }
        match categories {
            Ok(categories) => self.categories = categories,
            Err(e) => self
                .toasts
                .failure("Erreur lors du chargement des catégories", e),
        }

        self.fetch_comments().await;
    }

    /// 只加载编辑文章需要的分类列表，上传图片和插入格式时用
    pub async fn mount_editor(&mut self) {
        self.fetch_categories().await;
    }

    async fn fetch_articles(&mut self) {
        match self.backend.articles(&ArticleFilter::all()).await {
            Ok(articles) => self.articles = articles,
            Err(e) => self
                .toasts
                .failure("Erreur lors du chargement des articles", e),
        }
    }

    async fn fetch_categories(&mut self) {
        match self.backend.categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => self
                .toasts
                .failure("Erreur lors du chargement des catégories", e),
        }
    }

    async fn fetch_comments(&mut self) {
        match moderation_queue(&self.backend, &self.articles).await {
            Ok(comments) => self.comments = comments,
            Err(e) => self
                .toasts
                .failure("Erreur lors du chargement des commentaires", e),
        }
    }

    // ---- 文章 ----

    /// 打开空白的新建文章表单
    pub fn open_new_article(&mut self) {
        self.editing = None;
        self.article_form = ArticleForm::default();
        self.article_dialog_open = true;
    }

    /// 进入编辑模式：复制文章字段并记住其 id
    ///
    /// 文章不在当前列表中时返回 `false`。
    pub fn edit_article(&mut self, id: &str) -> bool {
        let Some(article) = self.articles.iter().find(|a| a.id == id) else {
            return false;
        };

        self.article_form = ArticleForm::from_article(article);
        self.editing = Some(article.id.clone());
        self.article_dialog_open = true;
        true
    }

    /// 恢复用户正在编辑的表单，空的 id 视为新建
    pub fn restore_article_form(&mut self, form: ArticleForm, editing: Option<String>) {
        self.article_form = form;
        self.editing = editing.filter(|id| !id.is_empty());
        self.article_dialog_open = true;
    }

    pub fn article_form_mut(&mut self) -> &mut ArticleForm {
        &mut self.article_form
    }

    /// 保存文章
    ///
    /// 必填字段缺失时不请求后端。成功后关闭对话框、重置表单并重新拉取文章列表。
    pub async fn save_article(&mut self) {
        if !self.article_form.is_complete() {
            self.toasts
                .error("Veuillez remplir tous les champs obligatoires");
            return;
        }

        let draft = self.article_form.to_draft();
        let result = match self.editing.as_deref() {
            Some(id) => self
                .backend
                .update_article(id, &draft)
                .await
                .map(|a| (a, "Article mis à jour avec succès")),
            None => self
                .backend
                .create_article(&draft)
                .await
                .map(|a| (a, "Article créé avec succès")),
        };

        match result {
            Ok((article, message)) => {
                tracing::info!(article = %article.id, "article saved");
                self.toasts.success(message);
                self.article_dialog_open = false;
                self.article_form = ArticleForm::default();
                self.editing = None;
                self.fetch_articles().await;
            }
            Err(e) => self
                .toasts
                .failure("Erreur lors de la sauvegarde de l'article", e),
        }
    }

    /// 删除文章，需要确认
    pub async fn delete_article(&mut self, id: &str, dialog: &impl Dialog) {
        if !dialog.confirm(CONFIRM_DELETE_ARTICLE) {
            return;
        }

        match self.backend.delete_article(id).await {
            Ok(()) => {
                self.toasts.success("Article supprimé avec succès");
                self.fetch_articles().await;
            }
            Err(e) => self.toasts.failure("Erreur lors de la suppression", e),
        }
    }

    /// 上传配图，只把返回的地址写入表单，文章保存时才生效
    ///
    /// 上一次上传尚未结束时忽略新的上传。
    pub async fn upload_image(&mut self, image: ImageUpload) {
        if self.uploading_image {
            tracing::warn!(file = %image.file_name, "upload already in progress");
            return;
        }

        self.uploading_image = true;
        match self.backend.upload_image(image).await {
            Ok(uploaded) => {
                self.article_form.image_url = uploaded.url;
                self.toasts.success("Image téléchargée avec succès");
            }
            Err(e) => self
                .toasts
                .failure("Erreur lors du téléchargement de l'image", e),
        }
        self.uploading_image = false;
    }

    /// 在正文选区插入格式标记
    ///
    /// 链接需要通过对话框输入地址，取消时正文不变。
    pub fn apply_format(&mut self, format: Format, selection: Selection, dialog: &impl Dialog) {
        let href = match format {
            Format::Link => dialog.prompt(LINK_PROMPT),
            _ => None,
        };
        let Some(markup) = Markup::from_format(format, href) else {
            return;
        };

        self.article_form.content = richtext::apply(&self.article_form.content, selection, &markup);
    }

    // ---- 分类 ----

    pub fn open_new_category(&mut self) {
        self.category_form = CategoryForm::default();
        self.category_dialog_open = true;
    }

    pub fn category_form_mut(&mut self) -> &mut CategoryForm {
        &mut self.category_form
    }

    /// 新建分类，名称和描述必填
    pub async fn save_category(&mut self) {
        if self.category_form.name.is_empty() || self.category_form.description.is_empty() {
            self.toasts.error("Veuillez remplir tous les champs");
            return;
        }

        match self
            .backend
            .create_category(&self.category_form.to_draft())
            .await
        {
            Ok(category) => {
                tracing::info!(category = %category.id, "category created");
                self.toasts.success("Catégorie créée avec succès");
                self.category_dialog_open = false;
                self.category_form = CategoryForm::default();
                self.fetch_categories().await;
            }
            Err(e) => self
                .toasts
                .failure("Erreur lors de la création de la catégorie", e),
        }
    }

    /// 删除分类，需要确认；不检查是否仍有文章引用该分类
    pub async fn delete_category(&mut self, id: &str, dialog: &impl Dialog) {
        if !dialog.confirm(CONFIRM_DELETE_CATEGORY) {
            return;
        }

        match self.backend.delete_category(id).await {
            Ok(()) => {
                self.toasts.success("Catégorie supprimée avec succès");
                self.fetch_categories().await;
            }
            Err(e) => self.toasts.failure("Erreur lors de la suppression", e),
        }
    }

    // ---- 评论 ----

    /// 审核通过评论，然后重新拉取全部评论
    pub async fn approve_comment(&mut self, id: &str) {
        match self.backend.approve_comment(id).await {
            Ok(()) => {
                self.toasts.success("Commentaire approuvé");
                self.fetch_comments().await;
            }
            Err(e) => self.toasts.failure("Erreur lors de l'approbation", e),
        }
    }

    /// 删除评论，需要确认
    pub async fn delete_comment(&mut self, id: &str, dialog: &impl Dialog) {
        if !dialog.confirm(CONFIRM_DELETE_COMMENT) {
            return;
        }

        match self.backend.delete_comment(id).await {
            Ok(()) => {
                self.toasts.success("Commentaire supprimé");
                self.fetch_comments().await;
            }
            Err(e) => self.toasts.failure("Erreur lors de la suppression", e),
        }
    }

    /// 待审核的评论
    pub fn pending_comments(&self) -> impl Iterator<Item = &ModeratedComment> {
        self.comments.iter().filter(|c| !c.comment.approved)
    }

    // ---- 状态 ----

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn comments(&self) -> &[ModeratedComment] {
        &self.comments
    }

    pub fn article_form(&self) -> &ArticleForm {
        &self.article_form
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_article_dialog_open(&self) -> bool {
        self.article_dialog_open
    }

    pub fn is_uploading_image(&self) -> bool {
        self.uploading_image
    }

    pub fn category_form(&self) -> &CategoryForm {
        &self.category_form
    }

    pub fn is_category_dialog_open(&self) -> bool {
        self.category_dialog_open
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }
}
