//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 命令行应用
//! - 初始化操作日志
//! - 解析命令，委托 `QuizFlow`
//!
//! ### `batch_creator` - 批量出题
//! - 扫描文件夹中的 TOML 表单
//! - 用 Semaphore 控制并发
//!
//! ## 层次关系
//!
//! ```text
//! app / batch_creator
//!     ↓
//! workflow::QuizFlow (create / load / add / check)
//!     ↓
//! services (field_key_parser / quiz_builder / state_codec / scoring / authoring)
//!     ↓
//! models (Quiz / FormFields / FieldKey)
//! ```

pub mod app;
pub mod batch_creator;

// 重新导出主要类型
pub use app::{App, Command};
pub use batch_creator::{create_all, BatchItem};
