//! 批量出题 - 编排层
//!
//! 扫描文件夹中所有出题表单，并发生成令牌。
//! 令牌路径完全无状态，各表单之间不共享任何可变数据，
//! 仅用 Semaphore 限制同时处理的数量。

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::load_all_form_files;
use crate::services::SessionId;
use crate::workflow::{QuizFlow, RequestCtx};

/// 单个表单的处理结果
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub path: PathBuf,
    /// 成功时为答题地址，失败时为错误信息
    pub outcome: Result<String, String>,
}

impl fmt::Display for BatchItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(redirect) => write!(f, "{}\t{}", self.path.display(), redirect),
            Err(e) => write!(f, "{}\t错误: {}", self.path.display(), e),
        }
    }
}

/// 处理文件夹中的所有表单，结果顺序与文件名顺序一致
pub async fn create_all(
    flow: Arc<QuizFlow>,
    folder: &Path,
    config: &Config,
) -> AppResult<Vec<BatchItem>> {
    info!("\n📁 正在扫描出题表单: {}", folder.display());
    let forms = load_all_form_files(folder).await?;

    if forms.is_empty() {
        warn!("⚠️ 没有找到待处理的表单");
        return Ok(Vec::new());
    }
    let concurrency = config.max_concurrent_forms.max(1);
    info!(
        "✓ 找到 {} 个表单，最多同时处理 {} 个",
        forms.len(),
        concurrency
    );

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::with_capacity(forms.len());

    for (path, form) in forms {
        let semaphore = Arc::clone(&semaphore);
        let flow = Arc::clone(&flow);
        let session = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let task_path = path.clone();

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return Err(e.to_string()),
            };
            let ctx = RequestCtx::new(SessionId::new(session));
            match flow.create(&ctx, &form) {
                Ok(created) => Ok(created.redirect),
                Err(e) => {
                    error!("{} ❌ {} 处理失败: {}", ctx, task_path.display(), e);
                    Err(e.to_string())
                }
            }
        });
        handles.push((path, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} 任务执行失败: {}", path.display(), e);
                Err(e.to_string())
            }
        };
        results.push(BatchItem { path, outcome });
    }

    let success = results.iter().filter(|r| r.outcome.is_ok()).count();
    info!("{}", "─".repeat(60));
    info!("✅ 成功: {}/{}", success, results.len());
    info!("{}", "─".repeat(60));

    Ok(results)
}
