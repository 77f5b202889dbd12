use crate::error::{AppError, AppResult};
use crate::models::form::{FieldValue, FormFields};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 解析 TOML 格式的表单内容
///
/// 顶层每个键是一个字段名，值可以是字符串、整数或字符串数组。
pub fn parse_form_fields(content: &str, source: &str) -> AppResult<FormFields> {
    let raw: BTreeMap<String, FieldValue> =
        toml::from_str(content).map_err(|e| AppError::toml_parse_failed(source, e))?;
    Ok(FormFields::from(raw))
}

/// 从 TOML 文件加载表单字段
pub async fn load_form_fields(path: &Path) -> AppResult<FormFields> {
    let shown = path.display().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&shown, e))?;

    let form = parse_form_fields(&content, &shown)?;
    tracing::info!("成功加载 {} 个表单字段: {}", form.len(), shown);

    Ok(form)
}

/// 从文件夹中加载所有 TOML 表单，按文件名排序
///
/// 单个文件加载失败只记录警告，不影响其他文件。
pub async fn load_all_form_files(folder_path: &Path) -> AppResult<Vec<(PathBuf, FormFields)>> {
    let shown = folder_path.display().to_string();
    let mut entries = fs::read_dir(folder_path)
        .await
        .map_err(|e| AppError::file_read_failed(&shown, e))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(&shown, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut forms = Vec::with_capacity(paths.len());
    for path in paths {
        match load_form_fields(&path).await {
            Ok(form) => forms.push((path, form)),
            Err(e) => tracing::warn!("加载文件失败 {}: {}", path.display(), e),
        }
    }

    if forms.is_empty() {
        tracing::warn!("在文件夹 {} 中没有找到可用的 TOML 表单", shown);
    }

    Ok(forms)
}
