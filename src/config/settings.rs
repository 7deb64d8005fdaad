// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、服务器、提供商、导入器和Webhook等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 外部任务提供商配置
    pub provider: ProviderSettings,
    /// 导入器配置
    pub importer: ImporterSettings,
    /// Webhook 配置
    pub webhook: WebhookSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 外部任务提供商配置设置
#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    /// 提供商API基础URL
    pub base_url: String,
    /// API账号
    pub login: String,
    /// API密码
    pub password: String,
    /// 单次请求超时时间（秒）
    pub request_timeout_secs: u64,
}

/// 导入器配置设置
///
/// 作为显式配置对象传入编排器/导入器，而不是进程级可变状态
#[derive(Debug, Clone, Deserialize)]
pub struct ImporterSettings {
    /// 批量写入的分块大小
    pub chunk_size: usize,
    /// 单次扫描处理的最大任务数
    pub max_jobs_per_sweep: u64,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 最大轮询次数，超出后任务以超时失败
    pub max_poll_attempts: u32,
    /// 任务提交后首次轮询前的固定延迟（秒）
    pub submit_delay_secs: u64,
    /// 扫描间隔（秒）
    pub sweep_interval_secs: u64,
}

impl ImporterSettings {
    /// 轮询间隔
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// 提交后延迟
    pub fn submit_delay(&self) -> Duration {
        Duration::from_secs(self.submit_delay_secs)
    }

    /// 扫描间隔
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Webhook配置设置
#[derive(Debug, Deserialize)]
pub struct WebhookSettings {
    /// Webhook签名密钥
    pub secret: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.url", "postgres://localhost/revsync")?
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 10)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default provider settings
            .set_default("provider.base_url", "https://api.dataforseo.com/v3")?
            .set_default("provider.login", "")?
            .set_default("provider.password", "")?
            .set_default("provider.request_timeout_secs", 30)?
            // Default importer settings
            .set_default("importer.chunk_size", 50)?
            .set_default("importer.max_jobs_per_sweep", 5)?
            .set_default("importer.poll_interval_secs", 30)?
            .set_default("importer.max_poll_attempts", 60)?
            .set_default("importer.submit_delay_secs", 10)?
            .set_default("importer.sweep_interval_secs", 15)?
            // Default Webhook settings
            .set_default("webhook.secret", "your-secret-key")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("REVSYNC").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        let settings = Settings::new().expect("default settings should load");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.importer.chunk_size, 50);
        assert_eq!(settings.importer.max_poll_attempts, 60);
        assert!(settings.importer.poll_interval() >= Duration::from_secs(1));
    }
}
