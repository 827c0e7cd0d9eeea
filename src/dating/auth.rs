use crate::dating::types::decode_api_response;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "_id", default)]
    legacy_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLoginData {
    token: String,
    user: LoginUser,
}

/// 登录结果：认证 token 与归一化后的用户 ID
#[derive(Debug, Clone)]
pub struct LoginData {
    pub token: String,
    pub user_id: String,
}

fn parse_login_body(status: reqwest::StatusCode, body: &[u8]) -> Result<LoginData> {
    let data = decode_api_response::<RawLoginData>(status, body, "登录")?.into_data("登录")?;
    let user_id = data
        .user
        .id
        .filter(|id| !id.is_empty())
        .or(data.user.legacy_id)
        .ok_or_else(|| anyhow::anyhow!("登录响应中缺少用户 id"))?;
    Ok(LoginData {
        token: data.token,
        user_id,
    })
}

pub async fn login_async(api_base_url: &str, email: String, password: String) -> Result<LoginData> {
    use uuid::Uuid;

    let client = reqwest::Client::new();
    let request_id = Uuid::new_v4().to_string();
    let url = format!("{}/auth/login", api_base_url.trim_end_matches('/'));

    info!("🔐 正在登录...");
    debug!("   URL: {}", url);
    debug!("   邮箱: {}", email);
    debug!("   RequestID: {}", request_id);

    let response = client
        .post(&url)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .header("X-Request-ID", &request_id)
        .json(&LoginRequest { email, password })
        .send()
        .await
        .context("登录请求失败")?;

    let status = response.status();
    let body = response.bytes().await.context("读取登录响应失败")?;
    let data = parse_login_body(status, &body)?;

    debug!("✅ 登录成功，用户ID: {}", data.user_id);
    Ok(data)
}
