pub mod dating;

// 重新导出常用类型和函数，方便外部使用
pub use dating::{
    client::{ClientConfig, DatingClient},
    interest::{Interest, InterestListener, InterestStats, InterestStatus, InterestStore},
    login_async,
};
