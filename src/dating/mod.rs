pub mod auth;
pub mod client;
pub mod interest;
pub mod types;

// 重新导出认证相关函数
pub use auth::login_async;
