//! 日志初始化

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "quiz_link=info";

/// 安装全局 tracing 订阅者
///
/// 过滤规则取自 `RUST_LOG`，未设置时为 `quiz_link=info`。
/// 重复调用不会报错，测试里可以随意调用。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 详细模式：本 crate 的 debug 日志也输出
pub fn init_verbose() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("quiz_link=debug"))
        .with_target(false)
        .try_init();
}
