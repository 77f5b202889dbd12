use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单道题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    /// 题号（来自字段名 `question-<q>-*`）
    pub number: u32,
    pub title: String,
    /// 选项，按答案编号升序
    #[serde(default)]
    pub answers: Vec<String>,
    /// 正确选项在 `answers` 中的位置（从 1 开始）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<u32>,
}

impl Question {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            title: String::new(),
            answers: Vec::new(),
            correct_answer: None,
        }
    }
}

/// 正确答案表：题号 → 正确选项（从 1 开始）
///
/// 以题号为键，迭代顺序即题号升序，与 `Quiz::questions` 的顺序一致。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectAnswers(BTreeMap<u32, u32>);

impl CorrectAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: u32, answer: u32) -> Option<u32> {
        self.0.insert(question, answer)
    }

    pub fn get(&self, question: u32) -> Option<u32> {
        self.0.get(&question).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按题目顺序排列的正确答案序列
    pub fn sequence(&self) -> Vec<u32> {
        self.0.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(q, a)| (*q, *a))
    }
}

impl FromIterator<(u32, u32)> for CorrectAnswers {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 完整测验，包括正确答案
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Quiz {
    pub title: String,
    /// 题目，按题号升序
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub correct_answers: CorrectAnswers,
}

impl Quiz {
    pub fn question(&self, number: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_follows_question_number() {
        let answers: CorrectAnswers = vec![(3, 2), (1, 4), (2, 1)].into_iter().collect();
        assert_eq!(answers.sequence(), vec![4, 1, 2]);
        assert_eq!(answers.get(3), Some(2));
        assert_eq!(answers.get(9), None);
    }

    #[test]
    fn test_correct_answers_serialize_as_map() {
        let answers: CorrectAnswers = vec![(1, 2)].into_iter().collect();
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"1":2}"#);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"title":"t","questions":[],"correct_answers":{},"extra":1}"#;
        assert!(serde_json::from_str::<Quiz>(json).is_err());
    }
}
