//! # Quiz Link
//!
//! 无状态的选择题测验：出题表单整体编码进一个 URL 安全的令牌，
//! 服务端在出题和答题之间不保存任何测验内容。
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - `Quiz` / `Question` / `CorrectAnswers`，表单字段 `FormFields`
//! - `models/loaders` - 从 TOML 文件加载表单
//!
//! ### ② 业务能力层（Services）
//! - `FieldKeyParser` - 拆解 `question-<q>-answer-<a>` 这类字段名
//! - `QuizBuilder` - 扁平字段 → 结构化测验
//! - `StateCodec` - 测验 ⇄ 令牌 (`base64url(zlib(json))`)
//! - `ScoringEngine` - 答题选择 vs 正确答案 → 百分比
//! - `AuthoringSessions` - 按会话分配出题序号
//!
//! ### ③ 流程层（Workflow）
//! - `QuizFlow` - create / load / add_question / add_answer / check
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 命令行应用
//! - `orchestrator/batch_creator` - 批量出题
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ErrorResponse};
pub use models::{CorrectAnswers, FormFields, Question, Quiz};
pub use orchestrator::{App, Command};
pub use services::{Score, StateCodec, Token};
pub use workflow::{QuizFlow, RequestCtx};
