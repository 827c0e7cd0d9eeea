//! 心动（Interest）模块
//!
//! 实现心动的加载、发送、删除，以及互相心动检测和统计投影

pub mod api;
pub mod gateway;
pub mod listener;
pub mod models;
pub mod projection;
pub mod reconcile;
pub mod service;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出主要类型和函数
pub use api::InterestApi;
pub use gateway::InterestGateway;
pub use listener::{EmptyInterestListener, InterestListener};
pub use models::{
    Interest, InterestResponse, InterestSnapshot, InterestStats, InterestStatus, ProfileSnapshot,
};
pub use service::InterestStore;
