//! 评分服务 - 业务能力层
//!
//! 把答题者提交的选择与令牌中的正确答案逐一比较，得到百分比分数。

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{CorrectAnswers, FieldKind, FormFields};
use crate::services::field_key_parser::{sort_field_keys, FieldKeyParser};

/// 对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// 第 i 个提交与第 i 个正确答案比较
    #[default]
    Positional,
    /// 按题号比较
    ByQuestion,
}

impl Alignment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" | "position" => Some(Alignment::Positional),
            "by-question" | "by_question" | "question" => Some(Alignment::ByQuestion),
            _ => None,
        }
    }
}

/// 一次作答：题号 → 选择（从 1 开始）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    selections: BTreeMap<u32, u32>,
}

impl Submission {
    /// 从答题表单读取选择
    ///
    /// 字段为 `question-<q>`，值是从 0 开始的选项下标；无法解析的字段跳过。
    pub fn from_form(form: &FormFields) -> Self {
        let parser = FieldKeyParser::strict();
        let mut names: Vec<&str> = form.names().collect();
        sort_field_keys(&mut names);

        let mut selections = BTreeMap::new();
        for name in names {
            let key = match parser.parse(name) {
                Ok(parsed) if parsed.key.kind == FieldKind::Question => parsed.key,
                _ => continue,
            };
            let Some(value) = form.first(name) else {
                continue;
            };
            match value.trim().parse::<u32>().ok().and_then(|i| i.checked_add(1)) {
                Some(answer) => {
                    selections.insert(key.question, answer);
                }
                None => warn!("⚠️ 题目 {} 的选择 '{}' 不是有效数字，已跳过", key.question, value),
            }
        }

        Self { selections }
    }

    pub fn insert(&mut self, question: u32, answer: u32) {
        self.selections.insert(question, answer);
    }

    /// 按题号排列的选择序列
    pub fn sequence(&self) -> Vec<u32> {
        self.selections.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

impl FromIterator<(u32, u32)> for Submission {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self {
            selections: iter.into_iter().collect(),
        }
    }
}

/// 评分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub submitted: usize,
    /// 四舍五入后的百分比
    pub percent: u32,
}

impl Score {
    /// `Score: <n>%`
    pub fn summary(&self) -> String {
        format!("Score: {}", self)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent)
    }
}

fn score_of(correct: usize, submitted: usize) -> Score {
    // 没有提交时定义为 0 分
    let percent = if submitted == 0 {
        0
    } else {
        (correct as f64 / submitted as f64 * 100.0).round() as u32
    };
    Score {
        correct,
        submitted,
        percent,
    }
}

/// 逐位比较，分母为提交数量
pub fn score_positional(submitted: &[u32], reference: &[u32]) -> Score {
    let correct = submitted
        .iter()
        .zip(reference)
        .filter(|(s, r)| s == r)
        .count();
    debug!(
        "逐位评分: 正确 {}/{} (参考答案 {} 个)",
        correct,
        submitted.len(),
        reference.len()
    );
    score_of(correct, submitted.len())
}

/// 按题号比较，分母为提交数量
pub fn score_by_question(submission: &Submission, reference: &CorrectAnswers) -> Score {
    let correct = submission
        .selections
        .iter()
        .filter(|(q, a)| reference.get(**q) == Some(**a))
        .count();
    debug!("按题号评分: 正确 {}/{}", correct, submission.len());
    score_of(correct, submission.len())
}

/// 评分引擎
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    alignment: Alignment,
}

impl ScoringEngine {
    pub fn new(alignment: Alignment) -> Self {
        Self { alignment }
    }

    pub fn score(&self, submission: &Submission, reference: &CorrectAnswers) -> Score {
        match self.alignment {
            Alignment::Positional => score_positional(&submission.sequence(), &reference.sequence()),
            Alignment::ByQuestion => score_by_question(submission, reference),
        }
    }
}

/// 旧格式参考答案解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegacyReferenceError {
    #[error("参考答案缺少方括号: {0}")]
    MissingBrackets(String),
    #[error("参考答案第 {position} 项 '{value}' 不是数字")]
    InvalidNumber { position: usize, value: String },
}

/// 解析旧格式的参考答案字符串，如 `[1 2 3]`
///
/// 旧页面把正确答案数组单独以文本形式回传，新流程直接使用令牌中的正确答案。
pub fn parse_legacy_reference(raw: &str) -> Result<Vec<u32>, LegacyReferenceError> {
    let inner = raw
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| LegacyReferenceError::MissingBrackets(raw.to_string()))?;

    inner
        .split_whitespace()
        .enumerate()
        .map(|(position, value)| {
            value
                .parse::<u32>()
                .map_err(|_| LegacyReferenceError::InvalidNumber {
                    position,
                    value: value.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_correct() {
        let score = score_positional(&[1, 2], &[1, 1]);
        assert_eq!(score.correct, 1);
        assert_eq!(score.to_string(), "50%");
    }

    #[test]
    fn test_perfect_score() {
        assert_eq!(score_positional(&[1, 2, 3], &[1, 2, 3]).to_string(), "100%");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(score_positional(&[1, 1, 1], &[1, 2, 2]).to_string(), "33%");
        assert_eq!(score_positional(&[1, 1, 1], &[1, 1, 2]).to_string(), "67%");
    }

    #[test]
    fn test_no_submissions_scores_zero() {
        let score = score_positional(&[], &[1, 2]);
        assert_eq!(score.percent, 0);
        assert_eq!(score.summary(), "Score: 0%");
    }

    #[test]
    fn test_longer_submission_than_reference() {
        // 多出来的提交不计分，但计入分母
        assert_eq!(score_positional(&[1, 2, 3, 4], &[1, 2]).to_string(), "50%");
    }

    #[test]
    fn test_submission_from_form_is_one_based_and_ordered() {
        let form: FormFields = vec![
            ("question-10", "0"),
            ("question-2", "1"),
            ("question-1", "x"),
            ("question-2-title", "ignored"),
            ("data", "token"),
        ]
        .into_iter()
        .collect();
        let submission = Submission::from_form(&form);
        assert_eq!(submission.sequence(), vec![2, 1]);
    }

    #[test]
    fn test_submission_skips_selection_out_of_range() {
        let form: FormFields = vec![
            ("question-1", "4294967295"),
            ("question-2", "99"),
            ("question-3", "-1"),
        ]
        .into_iter()
        .collect();
        let submission = Submission::from_form(&form);
        // 超出选项数量的选择照常记录，只是不会答对
        assert_eq!(submission.sequence(), vec![100]);

        let reference: CorrectAnswers = vec![(1, 1), (2, 1)].into_iter().collect();
        let score = ScoringEngine::default().score(&submission, &reference);
        assert_eq!(score.summary(), "Score: 0%");
    }

    #[test]
    fn test_alignment_modes_differ_when_question_skipped() {
        let reference: CorrectAnswers = vec![(1, 1), (2, 3), (3, 2)].into_iter().collect();
        // 跳过了第 2 题
        let submission: Submission = vec![(1, 1), (3, 2)].into_iter().collect();

        let positional = ScoringEngine::new(Alignment::Positional).score(&submission, &reference);
        assert_eq!(positional.to_string(), "50%");

        let by_question = ScoringEngine::new(Alignment::ByQuestion).score(&submission, &reference);
        assert_eq!(by_question.to_string(), "100%");
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(Alignment::parse("by-question"), Some(Alignment::ByQuestion));
        assert_eq!(Alignment::parse(" Positional "), Some(Alignment::Positional));
        assert_eq!(Alignment::parse("random"), None);
    }

    #[test]
    fn test_legacy_reference() {
        assert_eq!(parse_legacy_reference("[1 2 3]").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_legacy_reference("[]").unwrap(), Vec::<u32>::new());
        assert!(matches!(
            parse_legacy_reference("1 2"),
            Err(LegacyReferenceError::MissingBrackets(_))
        ));
        assert!(matches!(
            parse_legacy_reference("[1 a]"),
            Err(LegacyReferenceError::InvalidNumber { position: 1, .. })
        ));
    }
}
