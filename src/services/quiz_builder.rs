//! 测验构建服务 - 业务能力层
//!
//! 从扁平表单字段重建结构化测验，分两遍：
//! 1. 解析字段名并按题号分组
//! 2. 每道题按固定顺序应用：标题 → 选项（答案编号升序）→ 正确答案

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{CorrectAnswers, FieldKind, FormFields, Question, Quiz};
use crate::services::field_key_parser::{
    sort_field_keys, trailing_number, FieldKeyError, FieldKeyParser, ParseMode,
};

/// 测验标题字段名
pub const QUIZ_TITLE_FIELD: &str = "title";

/// 构建过程中的问题
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildWarning {
    #[error(transparent)]
    FieldKey(#[from] FieldKeyError),
    #[error("题目 {question} 的正确答案标记 '{value}' 末尾不是数字")]
    UnreadableCorrectMarker { question: u32, value: String },
    #[error("题目 {question} 的正确答案指向不存在的选项 {answer}")]
    MissingCorrectAnswer { question: u32, answer: u32 },
}

/// 严格模式下中止构建的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("表单字段无效: {0}")]
pub struct BuildError(pub BuildWarning);

/// 构建结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub quiz: Quiz,
    /// 宽松模式下被跳过或按 0 处理的字段
    pub warnings: Vec<BuildWarning>,
}

/// 单道题收集到的原始字段
#[derive(Debug, Default)]
struct QuestionFields<'a> {
    title: Option<&'a str>,
    /// (答案编号, 内容)，编号相同的选项都保留
    answers: Vec<(u32, &'a str)>,
    correct: Option<&'a str>,
}

/// 测验构建器
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizBuilder {
    parser: FieldKeyParser,
}

impl QuizBuilder {
    pub fn new(mode: ParseMode) -> Self {
        Self {
            parser: FieldKeyParser::new(mode),
        }
    }

    /// 从表单字段构建测验
    pub fn build(&self, form: &FormFields) -> Result<BuildReport, BuildError> {
        let mut warnings = Vec::new();
        let groups = self.group_by_question(form, &mut warnings)?;

        let mut quiz = Quiz {
            title: form.first(QUIZ_TITLE_FIELD).unwrap_or_default().to_string(),
            questions: Vec::with_capacity(groups.len()),
            correct_answers: CorrectAnswers::new(),
        };

        for (number, fields) in groups {
            let question = self.apply(number, fields, &mut warnings)?;
            if let Some(correct) = question.correct_answer {
                quiz.correct_answers.insert(number, correct);
            }
            quiz.questions.push(question);
        }

        if quiz.questions.is_empty() {
            warn!("⚠️ 表单中没有任何题目");
        }
        debug!(
            "构建完成: {} 道题, {} 个正确答案, {} 条警告",
            quiz.questions.len(),
            quiz.correct_answers.len(),
            warnings.len()
        );

        Ok(BuildReport { quiz, warnings })
    }

    /// 第一遍：解析字段名，按题号分组
    fn group_by_question<'a>(
        &self,
        form: &'a FormFields,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<BTreeMap<u32, QuestionFields<'a>>, BuildError> {
        let mut names: Vec<&str> = form.names().collect();
        sort_field_keys(&mut names);
        debug!("字段顺序: {:?}", names);

        let mut groups: BTreeMap<u32, QuestionFields<'a>> = BTreeMap::new();

        for name in names {
            let Some(value) = form.first(name) else {
                continue;
            };

            let parsed = match self.parser.parse(name) {
                Ok(parsed) => parsed,
                // 非题目字段（如测验标题）不属于这里
                Err(FieldKeyError::NotAQuestionField { .. }) => continue,
                Err(e) => {
                    self.report(e.into(), warnings)?;
                    continue;
                }
            };
            warnings.extend(parsed.warnings.into_iter().map(BuildWarning::from));

            let key = parsed.key;
            match key.kind {
                // 作答字段不参与出题
                FieldKind::Question => continue,
                FieldKind::Title => {
                    groups.entry(key.question).or_default().title = Some(value);
                }
                FieldKind::Answer => {
                    groups
                        .entry(key.question)
                        .or_default()
                        .answers
                        .push((key.answer, value));
                }
                FieldKind::Correct => {
                    groups.entry(key.question).or_default().correct = Some(value);
                }
            }
        }

        Ok(groups)
    }

    /// 第二遍：按固定顺序填充一道题
    fn apply(
        &self,
        number: u32,
        fields: QuestionFields<'_>,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<Question, BuildError> {
        let mut question = Question::new(number);
        if let Some(title) = fields.title {
            question.title = title.to_string();
        }

        // 稳定排序：编号相同的选项保持字段顺序
        let mut answers = fields.answers;
        answers.sort_by_key(|(answer, _)| *answer);
        let answer_numbers: Vec<u32> = answers.iter().map(|(answer, _)| *answer).collect();
        question.answers = answers
            .into_iter()
            .map(|(_, text)| text.to_string())
            .collect();

        if let Some(marker) = fields.correct {
            match trailing_number(marker) {
                Some(answer) => {
                    let position = answer_numbers.iter().position(|n| *n == answer);
                    question.correct_answer = Some(match position {
                        Some(index) => index as u32 + 1,
                        None => {
                            warnings.push(BuildWarning::MissingCorrectAnswer {
                                question: number,
                                answer,
                            });
                            answer
                        }
                    });
                }
                None => self.report(
                    BuildWarning::UnreadableCorrectMarker {
                        question: number,
                        value: marker.to_string(),
                    },
                    warnings,
                )?,
            }
        }

        Ok(question)
    }

    /// 严格模式下报错，宽松模式下记录警告
    fn report(
        &self,
        warning: BuildWarning,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<(), BuildError> {
        match self.parser.mode() {
            ParseMode::Strict => Err(BuildError(warning)),
            ParseMode::Permissive => {
                warn!("⚠️ 跳过字段: {}", warning);
                warnings.push(warning);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_build_single_question() {
        let form = form(&[
            ("question-1-title", "Capital?"),
            ("question-1-answer-1", "Paris"),
            ("question-1-answer-2", "Lyon"),
            ("question-1-correct", "answer-1-1"),
        ]);
        let report = QuizBuilder::default().build(&form).unwrap();

        let question = &report.quiz.questions[0];
        assert_eq!(question.title, "Capital?");
        assert_eq!(question.answers, vec!["Paris", "Lyon"]);
        assert_eq!(question.correct_answer, Some(1));
        assert_eq!(report.quiz.correct_answers.sequence(), vec![1]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_quiz_title_and_question_order() {
        let form = form(&[
            ("title", "Geography"),
            ("question-10-title", "Ten"),
            ("question-10-correct", "answer-10-1"),
            ("question-10-answer-1", "x"),
            ("question-2-title", "Two"),
            ("question-2-answer-1", "a"),
            ("question-2-answer-2", "b"),
            ("question-2-correct", "answer-2-2"),
        ]);
        let quiz = QuizBuilder::default().build(&form).unwrap().quiz;

        assert_eq!(quiz.title, "Geography");
        let numbers: Vec<u32> = quiz.questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![2, 10]);
        assert_eq!(quiz.correct_answers.sequence(), vec![2, 1]);
    }

    #[test]
    fn test_answers_ordered_by_number_not_arrival() {
        let form = form(&[
            ("question-1-answer-10", "ten"),
            ("question-1-answer-2", "two"),
            ("question-1-answer-1", "one"),
        ]);
        let quiz = QuizBuilder::default().build(&form).unwrap().quiz;
        assert_eq!(quiz.questions[0].answers, vec!["one", "two", "ten"]);
    }

    #[test]
    fn test_correct_answers_align_with_questions_for_any_arrival() {
        // 第 2 题没有正确答案标记：序列里只有第 1、3 题
        let pairs = [
            ("question-3-correct", "answer-3-2"),
            ("question-1-answer-1", "a"),
            ("question-3-answer-2", "d"),
            ("question-2-title", "t2"),
            ("question-1-correct", "answer-1-1"),
            ("question-3-answer-1", "c"),
            ("question-2-answer-1", "b"),
        ];
        let mut rotated = pairs.to_vec();
        for _ in 0..pairs.len() {
            rotated.rotate_left(1);
            let quiz = QuizBuilder::default().build(&form(&rotated)).unwrap().quiz;
            let with_marker: Vec<u32> = quiz
                .questions
                .iter()
                .filter_map(|q| q.correct_answer)
                .collect();
            assert_eq!(quiz.correct_answers.sequence(), with_marker);
            assert_eq!(quiz.correct_answers.sequence(), vec![1, 2]);
        }
    }

    #[test]
    fn test_correct_marker_maps_to_answer_position() {
        // 编号有空缺时，答案 3 是第 2 个选项
        let form = form(&[
            ("question-1-answer-1", "a"),
            ("question-1-answer-3", "c"),
            ("question-1-correct", "answer-1-3"),
        ]);
        let quiz = QuizBuilder::default().build(&form).unwrap().quiz;
        assert_eq!(quiz.questions[0].correct_answer, Some(2));
    }

    #[test]
    fn test_correct_marker_for_missing_answer_keeps_number() {
        let form = form(&[
            ("question-1-answer-1", "a"),
            ("question-1-correct", "answer-1-4"),
        ]);
        let report = QuizBuilder::default().build(&form).unwrap();
        assert_eq!(report.quiz.questions[0].correct_answer, Some(4));
        assert_eq!(
            report.warnings,
            vec![BuildWarning::MissingCorrectAnswer {
                question: 1,
                answer: 4
            }]
        );
    }

    #[test]
    fn test_strict_mode_rejects_malformed_key() {
        let form = form(&[("question-1-title", "ok"), ("question-1-answer-x", "bad")]);
        let err = QuizBuilder::new(ParseMode::Strict).build(&form).unwrap_err();
        assert!(matches!(
            err,
            BuildError(BuildWarning::FieldKey(FieldKeyError::InvalidNumber { .. }))
        ));
    }

    #[test]
    fn test_permissive_mode_skips_and_reports() {
        let form = form(&[
            ("question-1-title", "ok"),
            ("question-1-hint", "ignored"),
            ("question-1-correct", "answer-1-?"),
            ("question-1-answer-1", "a"),
        ]);
        let report = QuizBuilder::new(ParseMode::Permissive).build(&form).unwrap();
        assert_eq!(report.quiz.questions.len(), 1);
        assert_eq!(report.quiz.questions[0].correct_answer, None);
        assert!(report.quiz.correct_answers.is_empty());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_permissive_mode_keeps_answers_defaulted_to_same_number() {
        let form = form(&[
            ("question-1-answer-c", "C"),
            ("question-1-answer-1", "one"),
            ("question-1-answer-b", "B"),
        ]);
        let report = QuizBuilder::new(ParseMode::Permissive).build(&form).unwrap();
        assert_eq!(report.quiz.questions[0].answers, vec!["B", "C", "one"]);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_selection_fields_and_foreign_fields_ignored() {
        let form = form(&[("question-1", "0"), ("csrf", "token")]);
        let report = QuizBuilder::default().build(&form).unwrap();
        assert!(report.quiz.questions.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let mut form = FormFields::from(std::collections::BTreeMap::from([(
            "question-1-title".to_string(),
            crate::models::FieldValue::Many(Vec::new()),
        )]));
        form.append("question-2-title", "two");
        let quiz = QuizBuilder::default().build(&form).unwrap().quiz;
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].number, 2);
    }
}
