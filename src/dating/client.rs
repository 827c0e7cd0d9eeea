//! 客户端入口
//!
//! 持有配置、带认证的 HTTP 客户端以及心动仓库，把登录 / 登出转换为仓库的会话切换

use crate::dating::interest::{InterestApi, InterestGateway, InterestListener, InterestStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// 用户 ID
    pub user_id: String,
    /// 认证 token（Bearer）
    pub token: String,
    /// HTTP API 基础地址
    pub api_base_url: String,
    /// 单个 HTTP 请求的超时时间，仓库本身不做超时控制
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new(user_id: String, token: String) -> Self {
        Self {
            user_id,
            token,
            api_base_url: "http://localhost:3000/api".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// 创建带认证头的 HTTP 客户端（token 通过 default_headers 自动添加）
pub fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::AUTHORIZATION,
        reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .context("无效的 token")?,
    );
    reqwest::ClientBuilder::new()
        .default_headers(headers)
        .timeout(config.request_timeout)
        .build()
        .context("创建 HTTP 客户端失败")
}

/// 约会应用客户端
#[derive(Clone)]
pub struct DatingClient {
    config: ClientConfig,
    interests: Arc<InterestStore>,
}

impl DatingClient {
    /// 使用 HTTP 网关创建客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = build_http_client(&config)?;
        let api = InterestApi::new(http_client, config.api_base_url.clone());
        Ok(Self::with_gateway(config, Arc::new(api)))
    }

    /// 使用自定义网关创建客户端
    pub fn with_gateway(config: ClientConfig, gateway: Arc<dyn InterestGateway>) -> Self {
        info!(
            "[Client] 创建客户端，用户ID: {}, API: {}",
            config.user_id, config.api_base_url
        );
        Self {
            config,
            interests: Arc::new(InterestStore::new(gateway)),
        }
    }

    /// 注册心动监听器
    pub fn set_interest_listener(&self, listener: Arc<dyn InterestListener>) {
        self.interests.set_listener(listener);
    }

    /// 心动仓库
    pub fn interests(&self) -> &Arc<InterestStore> {
        &self.interests
    }

    /// 身份可用后调用：切换到配置中的用户并加载心动集合
    pub async fn on_login(&self) {
        info!("[Client] 🔐 用户 {} 已登录，刷新心动数据", self.config.user_id);
        self.interests.refresh(&self.config.user_id).await;
    }

    /// 登出：销毁心动会话
    pub async fn logout(&self) {
        info!("[Client] 👋 用户 {} 登出", self.config.user_id);
        self.interests.teardown().await;
    }
}
