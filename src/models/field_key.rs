use std::fmt;

/// 字段种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    /// `question-<q>`：答题时的选择
    Question,
    /// `question-<q>-title`
    Title,
    /// `question-<q>-answer-<a>`
    Answer,
    /// `question-<q>-correct`（旧表单写作 `ca`）
    Correct,
}

impl FieldKind {
    /// 该种类字段名应有的段数
    pub fn segment_count(self) -> usize {
        match self {
            FieldKind::Question => 2,
            FieldKind::Title | FieldKind::Correct => 3,
            FieldKind::Answer => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Question => "question",
            FieldKind::Title => "title",
            FieldKind::Answer => "answer",
            FieldKind::Correct => "correct",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 解析后的字段名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub question: u32,
    pub kind: FieldKind,
    /// 答案编号，非答案字段为 0
    pub answer: u32,
    pub segments: usize,
}

impl FieldKey {
    pub fn new(question: u32, kind: FieldKind, answer: u32) -> Self {
        Self {
            question,
            kind,
            answer,
            segments: kind.segment_count(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FieldKind::Question => write!(f, "question-{}", self.question),
            FieldKind::Answer => write!(f, "question-{}-answer-{}", self.question, self.answer),
            kind => write!(f, "question-{}-{}", self.question, kind),
        }
    }
}
