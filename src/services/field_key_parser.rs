//! 字段名解析 - 业务能力层
//!
//! 把 `question-<q>-answer-<a>` 这类扁平字段名拆成题号、种类、答案编号，
//! 并提供重建测验时使用的全序比较。

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

use crate::models::{FieldKey, FieldKind};

/// 种类关键字 → 字段种类
static KIND_KEYWORDS: phf::Map<&'static str, FieldKind> = phf::phf_map! {
    "title" => FieldKind::Title,
    "answer" => FieldKind::Answer,
    "correct" => FieldKind::Correct,
    "ca" => FieldKind::Correct,
};

/// 2 到 4 段：`question-<q>[-<kind>[-<a>]]`
static FIELD_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^question-([^-]*)(?:-([^-]*))?(?:-([^-]*))?$").expect("字段名正则无效")
});

const QUESTION_PREFIX: &str = "question-";

/// 字段名解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldKeyError {
    #[error("不是题目字段: {key}")]
    NotAQuestionField { key: String },
    #[error("字段 {key} 的{segment}段 '{value}' 不是有效数字")]
    InvalidNumber {
        key: String,
        segment: &'static str,
        value: String,
    },
    #[error("字段 {key} 的种类 '{kind}' 无法识别")]
    UnknownKind { key: String, kind: String },
    #[error("字段 {key} 段数错误: 期望 {expected}，实际 {actual}")]
    WrongSegmentCount {
        key: String,
        expected: usize,
        actual: usize,
    },
}

/// 解析模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// 数字段无效即报错
    #[default]
    Strict,
    /// 无效数字段按 0 处理，并记录警告
    Permissive,
}

/// 解析结果及宽松模式下产生的警告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub key: FieldKey,
    pub warnings: Vec<FieldKeyError>,
}

/// 字段名解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldKeyParser {
    mode: ParseMode,
}

impl FieldKeyParser {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(ParseMode::Strict)
    }

    pub fn permissive() -> Self {
        Self::new(ParseMode::Permissive)
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// 解析单个字段名
    ///
    /// 种类无法识别或段数不对时两种模式都会报错；
    /// 只有数字段在宽松模式下会被替换成 0。
    pub fn parse(&self, name: &str) -> Result<ParsedKey, FieldKeyError> {
        let Some(caps) = FIELD_KEY_PATTERN.captures(name) else {
            if name.starts_with(QUESTION_PREFIX) {
                return Err(FieldKeyError::WrongSegmentCount {
                    key: name.to_string(),
                    expected: 4,
                    actual: name.split('-').count(),
                });
            }
            return Err(FieldKeyError::NotAQuestionField {
                key: name.to_string(),
            });
        };

        let mut warnings = Vec::new();
        let question = self.number(name, "题号", &caps[1], &mut warnings)?;
        let actual = 2 + caps.get(2).is_some() as usize + caps.get(3).is_some() as usize;

        let kind = match caps.get(2) {
            None => FieldKind::Question,
            Some(m) => *KIND_KEYWORDS
                .get(m.as_str())
                .ok_or_else(|| FieldKeyError::UnknownKind {
                    key: name.to_string(),
                    kind: m.as_str().to_string(),
                })?,
        };

        if kind.segment_count() != actual {
            return Err(FieldKeyError::WrongSegmentCount {
                key: name.to_string(),
                expected: kind.segment_count(),
                actual,
            });
        }

        let answer = match caps.get(3) {
            Some(m) => self.number(name, "答案编号", m.as_str(), &mut warnings)?,
            None => 0,
        };

        Ok(ParsedKey {
            key: FieldKey {
                question,
                kind,
                answer,
                segments: actual,
            },
            warnings,
        })
    }

    fn number(
        &self,
        key: &str,
        segment: &'static str,
        value: &str,
        warnings: &mut Vec<FieldKeyError>,
    ) -> Result<u32, FieldKeyError> {
        match value.parse::<u32>() {
            Ok(n) => Ok(n),
            Err(_) => {
                let err = FieldKeyError::InvalidNumber {
                    key: key.to_string(),
                    segment,
                    value: value.to_string(),
                };
                match self.mode {
                    ParseMode::Strict => Err(err),
                    ParseMode::Permissive => {
                        warn!("⚠️ {}，按 0 处理", err);
                        warnings.push(err);
                        Ok(0)
                    }
                }
            }
        }
    }
}

/// 排序用的 (题号, 段数, 答案编号)，任何字符串都能得到一个值
fn sort_rank(name: &str) -> (u32, usize, u32) {
    let segments: Vec<&str> = name.split('-').collect();
    let number = |i: usize| {
        segments
            .get(i)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0)
    };
    (number(1), segments.len(), number(3))
}

/// 字段名全序：题号升序，再按段数升序，再按答案编号升序，最后按原字符串
pub fn compare_field_keys(a: &str, b: &str) -> Ordering {
    sort_rank(a).cmp(&sort_rank(b)).then_with(|| a.cmp(b))
}

/// 按 [`compare_field_keys`] 排序
pub fn sort_field_keys<S: AsRef<str>>(keys: &mut [S]) {
    keys.sort_by(|a, b| compare_field_keys(a.as_ref(), b.as_ref()));
}

/// 正确答案标记的值（如 `answer-1-2`）末段的数字
pub fn trailing_number(value: &str) -> Option<u32> {
    value.rsplit('-').next().and_then(|s| s.trim().parse().ok())
}
