use crate::{
    backend::{ArticleFilter, Backend},
    model::{Article, Category},
};

use super::Toasts;

/// 首页的展示状态
#[derive(Debug, PartialEq)]
pub enum HomeView<'a> {
    Loading,
    Empty,
    Articles(&'a [Article]),
}

/// 公开首页：已发布文章列表，支持分类筛选和关键字搜索
///
/// 两个筛选条件以“与”的方式组合成一次查询。搜索只在提交时执行，
/// 输入过程中不会请求后端。
pub struct HomePage<B> {
    backend: B,
    categories: Vec<Category>,
    articles: Vec<Article>,
    selected_category: Option<String>,
    search: String,
    loading: bool,
    toasts: Toasts,
}

impl<B: Backend> HomePage<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            categories: Vec::new(),
            articles: Vec::new(),
            selected_category: None,
            search: String::new(),
            loading: true,
            toasts: Toasts::default(),
        }
    }

    /// 恢复上一次提交的筛选条件，不发起请求
    pub fn restore(&mut self, category_id: Option<String>, search: impl Into<String>) {
        self.selected_category = category_id.filter(|id| !id.is_empty());
        self.search = search.into();
    }

    /// 挂载：同时加载分类和文章列表
    pub async fn mount(&mut self) {
        self.loading = true;
        let filter = self.filter();
        let (categories, articles) =
            tokio::join!(self.backend.categories(), self.backend.articles(&filter));

        match categories {
            Ok(categories) => self.categories = categories,
            Err(e) => self
                .toasts
                .failure("Erreur lors du chargement des catégories", e),
        }
        self.finish_articles(articles);
    }

    /// 输入搜索词，不触发查询
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// 提交搜索：按当前分类和搜索词重新查询
    pub async fn submit_search(&mut self) {
        self.fetch_articles().await;
    }

    /// 选择分类（`None` 为全部），并沿用当前搜索词重新查询
    pub async fn select_category(&mut self, category_id: Option<String>) {
        self.selected_category = category_id.filter(|id| !id.is_empty());
        self.fetch_articles().await;
    }

    /// 当前筛选条件对应的查询
    pub fn filter(&self) -> ArticleFilter {
        ArticleFilter::published(self.selected_category.as_deref(), &self.search)
    }

    async fn fetch_articles(&mut self) {
        self.loading = true;
        let filter = self.filter();
        let result = self.backend.articles(&filter).await;
        self.finish_articles(result);
    }

    fn finish_articles(&mut self, result: crate::error::Result<Vec<Article>>) {
        match result {
            Ok(articles) => self.articles = articles,
            Err(e) => self
                .toasts
                .failure("Erreur lors du chargement des articles", e),
        }
        self.loading = false;
    }

    pub fn view(&self) -> HomeView<'_> {
        if self.loading {
            HomeView::Loading
        } else if self.articles.is_empty() {
            HomeView::Empty
        } else {
            HomeView::Articles(&self.articles)
        }
    }

    /// 分类是否处于选中状态，`None` 对应“全部”
    pub fn is_selected(&self, category_id: Option<&str>) -> bool {
        self.selected_category.as_deref() == category_id
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }
}
