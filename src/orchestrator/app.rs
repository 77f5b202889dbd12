//! 命令行应用 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：操作日志文件、启动信息
//! 2. **命令解析**：`create` / `create-all` / `load` / `check`
//! 3. **向下委托**：所有业务都交给 `QuizFlow`
//! 4. **结果输出**：返回要打印到标准输出的文本

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::load_form_fields;
use crate::orchestrator::batch_creator;
use crate::utils::logging::{append_log_line, init_log_file, log_startup};
use crate::workflow::{QuizFlow, RequestCtx};

const USAGE: &str = "用法:
  quiz_link create <form.toml>
  quiz_link create-all <folder>
  quiz_link load <token>
  quiz_link check <token> <answers.toml>";

/// 命令行命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 出题表单 → 答题地址
    Create { form: PathBuf },
    /// 文件夹中所有出题表单 → 答题地址
    CreateAll { folder: PathBuf },
    /// 令牌 → 测验 JSON
    Load { token: String },
    /// 令牌 + 答题表单 → 分数
    Check { token: String, answers: PathBuf },
}

impl Command {
    /// 解析命令行参数（不含程序名）
    pub fn parse<I, S>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let arg = |i: usize| args.get(i).cloned().ok_or_else(|| AppError::usage(USAGE));

        let command = match args.first().map(String::as_str) {
            Some("create") => Command::Create {
                form: arg(1)?.into(),
            },
            Some("create-all") => Command::CreateAll {
                folder: arg(1)?.into(),
            },
            Some("load") => Command::Load { token: arg(1)? },
            Some("check") => Command::Check {
                token: arg(1)?,
                answers: arg(2)?.into(),
            },
            _ => return Err(AppError::usage(USAGE)),
        };
        Ok(command)
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::CreateAll { .. } => "create-all",
            Command::Load { .. } => "load",
            Command::Check { .. } => "check",
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<QuizFlow>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        Ok(Self {
            flow: Arc::new(QuizFlow::new(&config)),
            config,
        })
    }

    pub fn flow(&self) -> &QuizFlow {
        &self.flow
    }

    /// 执行命令，返回要输出的文本
    pub async fn run(&self, command: Command) -> AppResult<String> {
        let ctx = RequestCtx::anonymous();
        info!("{} ▶ 执行命令: {}", ctx, command.name());

        let result = self.dispatch(&ctx, command.clone()).await;

        let line = match &result {
            Ok(_) => format!("{} {} 成功", ctx, command.name()),
            Err(e) => format!("{} {} 失败: {}", ctx, command.name(), e),
        };
        append_log_line(&self.config.output_log_file, &line)?;

        result
    }

    async fn dispatch(&self, ctx: &RequestCtx, command: Command) -> AppResult<String> {
        match command {
            Command::Create { form } => {
                let form = load_form_fields(&form).await?;
                let created = self.flow.create(ctx, &form)?;
                Ok(created.redirect)
            }
            Command::CreateAll { folder } => {
                let results =
                    batch_creator::create_all(Arc::clone(&self.flow), &folder, &self.config)
                        .await?;
                Ok(results
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Command::Load { token } => {
                let loaded = self.flow.load(ctx, &token)?;
                serde_json::to_string_pretty(&loaded.quiz)
                    .map_err(|e| AppError::Encode(e.into()))
            }
            Command::Check { token, answers } => {
                let answers = load_form_fields(&answers).await?;
                let score = self.flow.check(ctx, &answers, &token)?;
                Ok(score.summary())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse(["create", "form.toml"]).unwrap(),
            Command::Create {
                form: PathBuf::from("form.toml")
            }
        );
        assert_eq!(
            Command::parse(["check", "abc", "answers.toml"]).unwrap(),
            Command::Check {
                token: "abc".to_string(),
                answers: PathBuf::from("answers.toml")
            }
        );
        assert_eq!(
            Command::parse(["load", "abc"]).unwrap(),
            Command::Load {
                token: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_parse_usage_errors() {
        assert!(matches!(
            Command::parse(Vec::<String>::new()),
            Err(AppError::Usage(_))
        ));
        assert!(matches!(Command::parse(["check", "abc"]), Err(AppError::Usage(_))));
        assert!(matches!(Command::parse(["serve"]), Err(AppError::Usage(_))));
    }
}
