//! 通用 HTTP 响应结构与处理函数

use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use tracing::{debug, error, info};

/// 反序列化数组字段，处理 null 值
pub(crate) fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 宽松的时间戳反序列化：接受 RFC 3339 字符串或毫秒时间戳，其余情况（含 null、格式错误）返回 None
pub(crate) fn deserialize_timestamp_lenient<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    Ok(parsed)
}

/// 统一的 API 响应包装结构体（success、data、error）
/// data / error 字段可能为 null 或缺失，因此使用 Option
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// 取出 data 字段，缺失时返回错误
    pub fn into_data(self, operation_name: &str) -> anyhow::Result<T> {
        self.data
            .ok_or_else(|| anyhow::anyhow!("{}响应中缺少 data 字段", operation_name))
    }
}

/// 将 HTTP 状态和响应 body 解析为统一的响应结构体
///
/// HTTP 失败、反序列化失败以及 `success: false` 都会变成错误，
/// 调用方因此可以用同一种方式处理所有失败。
pub fn decode_api_response<T: serde::de::DeserializeOwned>(
    status: StatusCode,
    body_bytes: &[u8],
    operation_name: &str,
) -> anyhow::Result<ApiResponse<T>> {
    let body_str = String::from_utf8_lossy(body_bytes);

    if !status.is_success() {
        // 服务器在 4xx/5xx 时通常也会带上 error 字段，优先使用
        let server_error = serde_json::from_slice::<ApiResponse<serde_json::Value>>(body_bytes)
            .ok()
            .and_then(|r| r.error);
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(anyhow::anyhow!(
            "HTTP 错误 {}: {}",
            status,
            server_error.unwrap_or_else(|| body_str.to_string())
        ));
    }
    debug!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

    let api_resp: ApiResponse<T> = serde_json::from_slice(body_bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation_name, e, body_str
        );
        anyhow::anyhow!("反序列化响应失败: {:?}", e)
    })?;

    if !api_resp.success {
        let msg = api_resp.error.as_deref().unwrap_or("未知错误");
        error!("[HTTP] {}服务器返回失败: {}", operation_name, msg);
        return Err(anyhow::anyhow!("服务器错误: {}", msg));
    }

    Ok(api_resp)
}

/// 通用 HTTP 响应处理函数：读取 body 后交给 [`decode_api_response`]
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> anyhow::Result<ApiResponse<T>> {
    let status = response.status();

    // body 只能读取一次
    let body_bytes = response.bytes().await.context("读取响应 body 失败")?;
    info!(
        "[HTTP] {}响应 Body: {}",
        operation_name,
        String::from_utf8_lossy(&body_bytes)
    );

    decode_api_response(status, &body_bytes, operation_name)
}
