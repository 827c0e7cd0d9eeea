//! 心动 HTTP API 客户端
//!
//! 负责所有心动相关的 HTTP 请求

use crate::dating::interest::gateway::InterestGateway;
use crate::dating::interest::models::{Interest, InterestStatus};
use crate::dating::interest::types::{
    decode_interest_records, InterestStatusResp, SendInterestReq,
};
use crate::dating::types::handle_http_response;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

/// 请求追踪头
const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// 心动相关的 HTTP API 客户端
pub struct InterestApi {
    client: reqwest::Client,
    api_base_url: String,
}

impl InterestApi {
    /// 创建新的心动 API 客户端
    ///
    /// `client` 应该已经在外部配置好认证头和超时
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    async fn fetch_interests(&self, path: &str, operation_name: &str) -> Result<Vec<Interest>> {
        let request_id = Uuid::new_v4().to_string();
        let url = self.url(path);

        info!("[InterestAPI] 📡 请求{}", operation_name);
        debug!("[InterestAPI]   请求URL: {}, 请求ID: {}", url, request_id);

        let response = self
            .client
            .get(&url)
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .context("请求失败")?;

        // data 为 null 时视为空列表；逐条解析，坏记录不影响整个列表
        let records = handle_http_response::<Vec<serde_json::Value>>(response, operation_name)
            .await?
            .data
            .unwrap_or_default();

        let interests = decode_interest_records(records);
        info!(
            "[InterestAPI] ✅ {}响应，条目数: {}",
            operation_name,
            interests.len()
        );
        Ok(interests)
    }
}

#[async_trait]
impl InterestGateway for InterestApi {
    async fn get_sent_interests(&self, user_id: &str) -> Result<Vec<Interest>> {
        self.fetch_interests(&format!("/interests/sent/{}", user_id), "已发送心动列表")
            .await
    }

    async fn get_received_interests(&self, user_id: &str) -> Result<Vec<Interest>> {
        self.fetch_interests(&format!("/interests/received/{}", user_id), "已收到心动列表")
            .await
    }

    async fn send_interest(&self, to_user_id: &str) -> Result<()> {
        let request_id = Uuid::new_v4().to_string();
        let url = self.url("/interests");

        info!("[InterestAPI] 📡 发送心动 -> {}", to_user_id);
        debug!("[InterestAPI]   请求URL: {}, 请求ID: {}", url, request_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header(REQUEST_ID_HEADER, &request_id)
            .json(&SendInterestReq {
                to_user_id: to_user_id.to_string(),
            })
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "发送心动").await?;
        Ok(())
    }

    async fn remove_interest(&self, to_user_id: &str) -> Result<()> {
        let request_id = Uuid::new_v4().to_string();
        let url = self.url(&format!("/interests/{}", to_user_id));

        info!("[InterestAPI] 📡 删除心动 -> {}", to_user_id);
        debug!("[InterestAPI]   请求URL: {}, 请求ID: {}", url, request_id);

        let response = self
            .client
            .delete(&url)
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "删除心动").await?;
        Ok(())
    }

    async fn get_interest_status(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<Option<InterestStatus>> {
        let request_id = Uuid::new_v4().to_string();
        let url = self.url(&format!("/interests/status/{}/{}", user_id, other_user_id));

        debug!(
            "[InterestAPI] 📡 查询心动状态 {} -> {}, 请求ID: {}",
            user_id, other_user_id, request_id
        );

        let response = self
            .client
            .get(&url)
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .context("请求失败")?;

        let resp = handle_http_response::<InterestStatusResp>(response, "查询心动状态").await?;
        Ok(resp.data.and_then(|d| d.status))
    }
}
