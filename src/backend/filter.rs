use serde::Serialize;

/// 文章列表查询条件，对应 `GET /api/articles` 的查询参数
///
/// 各条件之间是“与”的关系，未设置的条件不会出现在查询串中。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleFilter {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub published_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ArticleFilter {
    /// 公开站点使用的查询：只包含已发布文章
    ///
    /// 空字符串的分类或搜索词视为未设置。
    pub fn published(category_id: Option<&str>, search: &str) -> Self {
        Self {
            published_only: true,
            category_id: category_id
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            search: Some(search.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// 后台使用的查询：所有文章
    pub fn all() -> Self {
        Self::default()
    }
}
