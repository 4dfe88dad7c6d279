//! 页面状态
//!
//! 每个页面在挂载时从后端拉取数据，页面结束后丢弃，页面之间不共享缓存。

pub mod admin;
mod article;
mod dialog;
mod home;
mod toast;

pub use self::{
    admin::{AdminPage, ArticleForm, CategoryForm, Tab},
    article::{ArticlePage, ArticleState, CommentForm},
    dialog::{Answers, Dialog},
    home::{HomePage, HomeView},
    toast::{Toast, ToastLevel, Toasts},
};
