use crate::services::field_key_parser::ParseMode;
use crate::services::scoring::Alignment;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 答题页面路由，令牌作为 `data` 查询参数附在后面
    pub quiz_route: String,
    /// 字段名解析是否严格
    pub strict_field_keys: bool,
    /// 评分对齐方式
    pub scoring_alignment: Alignment,
    /// zlib 压缩级别 (0-9)
    pub compression_level: u32,
    /// 令牌解压后的最大字节数
    pub max_payload_bytes: usize,
    /// 批量出题时同时处理的表单数量
    pub max_concurrent_forms: usize,
    /// 同时保留的出题会话上限，超出时淘汰最久未使用的会话
    pub max_authoring_sessions: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 操作日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiz_route: "/quiz".to_string(),
            strict_field_keys: true,
            scoring_alignment: Alignment::Positional,
            compression_level: 6,
            max_payload_bytes: 1024 * 1024,
            max_concurrent_forms: 8,
            max_authoring_sessions: 1024,
            verbose_logging: false,
            output_log_file: "quiz_link.log".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            quiz_route: std::env::var("QUIZ_ROUTE").unwrap_or(default.quiz_route),
            strict_field_keys: std::env::var("STRICT_FIELD_KEYS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.strict_field_keys),
            scoring_alignment: std::env::var("SCORING_ALIGNMENT").ok().and_then(|v| Alignment::parse(&v)).unwrap_or(default.scoring_alignment),
            compression_level: std::env::var("COMPRESSION_LEVEL").ok().and_then(|v| v.parse().ok()).filter(|l| *l <= 9).unwrap_or(default.compression_level),
            max_payload_bytes: std::env::var("MAX_PAYLOAD_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_payload_bytes),
            max_concurrent_forms: std::env::var("MAX_CONCURRENT_FORMS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_forms),
            max_authoring_sessions: std::env::var("MAX_AUTHORING_SESSIONS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_authoring_sessions),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    pub fn parse_mode(&self) -> ParseMode {
        if self.strict_field_keys {
            ParseMode::Strict
        } else {
            ParseMode::Permissive
        }
    }
}
