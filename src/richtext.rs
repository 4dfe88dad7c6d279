//! 正文编辑器的格式插入
//!
//! 把选中的文本（没有选中时使用占位文字）包裹在对应的 HTML 标签中，
//! 再按原来的位置拼回正文。偏移量以 UTF-16 码元计，与浏览器文本框的
//! `selectionStart` / `selectionEnd` 一致。

use std::str::FromStr;

use crate::error::Error;

/// 工具栏上的格式按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Heading,
    List,
    Link,
    Paragraph,
}

impl Format {
    /// 表单中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Bold => "bold",
            Format::Italic => "italic",
            Format::Heading => "h2",
            Format::List => "ul",
            Format::Link => "link",
            Format::Paragraph => "p",
        }
    }

    /// 没有选中文本时插入的占位文字
    pub fn placeholder(&self) -> &'static str {
        match self {
            Format::Bold => "texte en gras",
            Format::Italic => "texte en italique",
            Format::Heading => "Titre",
            Format::List => "élément de liste",
            Format::Link => "lien",
            Format::Paragraph => "paragraphe",
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(Format::Bold),
            "italic" => Ok(Format::Italic),
            "h2" => Ok(Format::Heading),
            "ul" => Ok(Format::List),
            "link" => Ok(Format::Link),
            "p" => Ok(Format::Paragraph),
            _ => Err(Error::FormatError("unknown format")),
        }
    }
}

/// 已经确定的标记，链接带有地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Bold,
    Italic,
    Heading,
    List,
    Link(String),
    Paragraph,
}

impl Markup {
    /// 链接需要地址，其他格式可以直接确定
    pub fn from_format(format: Format, href: Option<String>) -> Option<Markup> {
        match format {
            Format::Bold => Some(Markup::Bold),
            Format::Italic => Some(Markup::Italic),
            Format::Heading => Some(Markup::Heading),
            Format::List => Some(Markup::List),
            Format::Link => href.map(Markup::Link),
            Format::Paragraph => Some(Markup::Paragraph),
        }
    }

    fn format(&self) -> Format {
        match self {
            Markup::Bold => Format::Bold,
            Markup::Italic => Format::Italic,
            Markup::Heading => Format::Heading,
            Markup::List => Format::List,
            Markup::Link(_) => Format::Link,
            Markup::Paragraph => Format::Paragraph,
        }
    }

    fn wrap(&self, inner: &str) -> String {
        match self {
            Markup::Bold => format!("<strong>{}</strong>", inner),
            Markup::Italic => format!("<em>{}</em>", inner),
            Markup::Heading => format!("<h2>{}</h2>", inner),
            Markup::List => format!("<ul><li>{}</li></ul>", inner),
            Markup::Link(href) => format!("<a href=\"{}\">{}</a>", href.replace('"', "&quot;"), inner),
            Markup::Paragraph => format!("<p>{}</p>", inner),
        }
    }
}

/// 正文中的选区，`start == end` 表示光标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn cursor(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// 光标位于正文末尾
    pub fn end_of(content: &str) -> Self {
        Self::cursor(content.encode_utf16().count())
    }

    /// 限制在正文范围内，并保证 `start <= end`
    fn clamp(self, len: usize) -> Self {
        let start = self.start.min(len);
        let end = self.end.min(len);
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }
}

/// UTF-16 偏移转字节偏移，落在代理对中间时取下一个字符的起点
fn byte_offset(content: &str, units: usize) -> usize {
    let mut seen = 0;
    for (i, c) in content.char_indices() {
        if seen >= units {
            return i;
        }
        seen += c.len_utf16();
    }
    content.len()
}

/// 在选区位置插入标记，返回新的正文
///
/// ```
/// use epage::richtext::{Markup, Selection, apply};
///
/// let content = apply("Bonjour le monde", Selection::new(8, 10), &Markup::Bold);
/// assert_eq!(content, "Bonjour <strong>le</strong> monde");
/// ```
pub fn apply(content: &str, selection: Selection, markup: &Markup) -> String {
    let selection = selection.clamp(content.encode_utf16().count());
    let start = byte_offset(content, selection.start);
    let end = byte_offset(content, selection.end);

    let selected = &content[start..end];
    let inner = if selected.is_empty() {
        markup.format().placeholder()
    } else {
        selected
    };

    let mut result = String::with_capacity(content.len() + inner.len() + 32);
    result.push_str(&content[..start]);
    result.push_str(&markup.wrap(inner));
    result.push_str(&content[end..]);
    result
}
