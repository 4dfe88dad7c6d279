use std::{env, path::Path};

use serde::Deserialize;

use crate::error::Result;

/// 前端服务配置
///
/// 加载顺序：默认值 → `EPAGE_CONFIG` 指向的 TOML 文件 → 环境变量
/// `EPAGE_BACKEND_URL`、`EPAGE_LISTEN`。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听地址
    pub listen: String,
    /// 后端 REST 服务的源地址，例如 `http://localhost:8000`，接口位于其 `/api` 下
    pub backend_url: String,
    pub site: Site,
}

/// 站点展示文案
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Site {
    pub title: String,
    pub tagline: String,
    pub admin_subtitle: String,
    pub footer: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            backend_url: "http://localhost:8000".to_string(),
            site: Site::default(),
        }
    }
}

impl Default for Site {
    fn default() -> Self {
        Self {
            title: "E-Page Congo".to_string(),
            tagline: "Actualités Politiques de la RDC".to_string(),
            admin_subtitle: "Gestion du blog E-Page Congo".to_string(),
            footer: "© 2025 E-Page Congo. Tous droits réservés.".to_string(),
        }
    }
}

impl Config {
    /// 从 TOML 文本解析配置，未出现的字段使用默认值
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// 读取 TOML 配置文件
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// 按默认值、配置文件、环境变量的顺序加载配置
    pub fn load() -> Result<Self> {
        let mut config = match env::var("EPAGE_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(url) = env::var("EPAGE_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Ok(listen) = env::var("EPAGE_LISTEN") {
            config.listen = listen;
        }

        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        let trimmed = self.backend_url.trim().trim_end_matches('/');
        self.backend_url = trimmed.to_string();
    }
}
