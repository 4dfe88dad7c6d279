use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// 页面上短暂显示的一条通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    /// 模板中使用的样式类名
    pub fn class(&self) -> &'static str {
        match self.level {
            ToastLevel::Success => "toast-success",
            ToastLevel::Error => "toast-error",
        }
    }
}

/// 页面在一次挂载期间积累的通知
///
/// 后端调用失败不会向上传播，而是记录日志并转为一条错误通知。
#[derive(Debug, Default)]
pub struct Toasts(Vec<Toast>);

impl Toasts {
    pub fn success(&mut self, message: impl Into<String>) {
        self.0.push(Toast {
            level: ToastLevel::Success,
            message: message.into(),
        });
    }

    /// 用户输入错误等不需要记录日志的失败
    pub fn error(&mut self, message: impl Into<String>) {
        self.0.push(Toast {
            level: ToastLevel::Error,
            message: message.into(),
        });
    }

    /// 后端调用失败：记录错误日志并通知用户
    pub fn failure(&mut self, message: impl Into<String>, error: impl Display) {
        let message = message.into();
        tracing::error!(%error, "{}", message);
        self.error(message);
    }

    pub fn as_slice(&self) -> &[Toast] {
        &self.0
    }

    /// 最近一条通知
    #[cfg(test)]
    pub fn last(&self) -> Option<&Toast> {
        self.0.last()
    }

    #[cfg(test)]
    pub fn contains(&self, level: ToastLevel, message: &str) -> bool {
        self.0.iter().any(|t| t.level == level && t.message == message)
    }
}
