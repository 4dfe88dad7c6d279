/// 阻塞式对话框：确认框和输入框
///
/// 删除操作必须经过 [`Dialog::confirm`]，插入链接需要 [`Dialog::prompt`] 提供地址。
pub trait Dialog {
    fn confirm(&self, message: &str) -> bool;

    /// 返回 `None` 表示用户取消
    fn prompt(&self, message: &str) -> Option<String>;
}

/// 预先给定答案的对话框
///
/// 服务端渲染时，答案来自用户提交的表单。
#[derive(Debug, Clone, Default)]
pub struct Answers {
    pub confirmed: bool,
    pub input: Option<String>,
}

impl Answers {
    pub fn confirmed() -> Self {
        Self {
            confirmed: true,
            input: None,
        }
    }

    pub fn declined() -> Self {
        Self::default()
    }

    pub fn input(value: impl Into<String>) -> Self {
        Self {
            confirmed: true,
            input: Some(value.into()),
        }
    }
}

impl Dialog for Answers {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, confirmed = self.confirmed, "confirm");
        self.confirmed
    }

    /// 空字符串与取消等价
    fn prompt(&self, message: &str) -> Option<String> {
        tracing::debug!(message, "prompt");
        self.input
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
