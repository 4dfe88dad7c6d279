use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 文章
///
/// `category_name` 由后端根据 `category_id` 冗余写入，前端只做展示。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    /// HTML 正文
    pub content: String,
    pub author: String,
    pub category_id: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(deserialize_with = "parse_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "parse_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    /// 配图地址，空字符串视为没有配图
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// 文章分类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 展示用的十六进制颜色
    pub color: String,
    #[serde(default, deserialize_with = "parse_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// 读者评论，新建时未审核
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub article_id: String,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(deserialize_with = "parse_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// 创建或更新文章时提交的内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category_id: String,
    /// 空字符串表示没有配图
    pub image_url: String,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentDraft {
    pub article_id: String,
    pub author: String,
    pub content: String,
}

/// 审核列表中的评论，附带所属文章标题
#[derive(Debug, Clone, PartialEq)]
pub struct ModeratedComment {
    pub comment: Comment,
    pub article_title: String,
}

/// 待上传的图片文件
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 上传接口的返回值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

/// 解析后端时间戳
///
/// 优先按 RFC 3339 解析；没有时区的 ISO 时间按 UTC 处理。
pub fn parse_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    timestamp_from_str(&s).ok_or_else(|| serde::de::Error::custom(format!("无法解析时间: {}", s)))
}

fn parse_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => timestamp_from_str(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("无法解析时间: {}", s))),
        None => Ok(None),
    }
}

fn timestamp_from_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    None
}
