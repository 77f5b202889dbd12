//! 出题会话服务 - 业务能力层
//!
//! 出题页面每点一次"添加题目"/"添加选项"，就从这里取一个新的序号，
//! 用来生成 `question-<q>-answer-<a>` 这样的字段名。
//! 序号只属于单个会话，不同作者互不影响。

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::debug;

/// 会话标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringError {
    #[error("题目 {0} 不存在，无法添加选项")]
    UnknownQuestion(u32),
}

/// 新分配的选项序号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSlot {
    pub question: u32,
    pub answer: u32,
}

/// 单个出题会话的序号状态
#[derive(Debug, Clone, Default)]
pub struct AuthoringSession {
    /// 下标 i 是第 i+1 题已分配的选项数
    answer_counts: Vec<u32>,
}

impl AuthoringSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配新题号（从 1 开始）
    pub fn add_question(&mut self) -> u32 {
        self.answer_counts.push(0);
        self.answer_counts.len() as u32
    }

    /// 为指定题目分配新选项序号（从 1 开始）
    pub fn add_answer(&mut self, question: u32) -> Result<AnswerSlot, AuthoringError> {
        let count = question
            .checked_sub(1)
            .and_then(|i| self.answer_counts.get_mut(i as usize))
            .ok_or(AuthoringError::UnknownQuestion(question))?;
        *count += 1;
        Ok(AnswerSlot {
            question,
            answer: *count,
        })
    }

    pub fn question_count(&self) -> u32 {
        self.answer_counts.len() as u32
    }

    /// 重新开始（重新打开出题页面时）
    pub fn reset(&mut self) {
        self.answer_counts.clear();
    }
}

/// 默认最多同时保留的出题会话数
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

#[derive(Debug)]
struct SessionEntry {
    session: AuthoringSession,
    /// 最近一次使用时的序号，越大越新
    touched: u64,
}

#[derive(Debug, Default)]
struct Registry {
    entries: HashMap<SessionId, SessionEntry>,
    clock: u64,
}

impl Registry {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// 按会话隔离的出题状态表
///
/// 会话在以下情况释放：
/// - 出题成功（`finish`）
/// - 重新打开出题页面（`reset`）
/// - 会话数达到上限时，最久未使用的会话被淘汰
#[derive(Debug)]
pub struct AuthoringSessions {
    registry: Mutex<Registry>,
    capacity: usize,
}

impl Default for AuthoringSessions {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl AuthoringSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// `capacity` 至少为 1
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // 序号表里没有跨字段的约束，锁中毒后继续使用
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_question(&self, session: &SessionId) -> u32 {
        let mut registry = self.lock();
        let touched = registry.tick();

        if !registry.entries.contains_key(session) && registry.entries.len() >= self.capacity {
            let oldest = registry
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                registry.entries.remove(&oldest);
                debug!("[会话 {}] 会话数达到上限 {}，已淘汰", oldest, self.capacity);
            }
        }

        let entry = registry
            .entries
            .entry(session.clone())
            .or_insert_with(|| SessionEntry {
                session: AuthoringSession::new(),
                touched,
            });
        entry.touched = touched;
        let question = entry.session.add_question();
        debug!("[会话 {}] 分配题号 {}", session, question);
        question
    }

    pub fn add_answer(
        &self,
        session: &SessionId,
        question: u32,
    ) -> Result<AnswerSlot, AuthoringError> {
        let mut registry = self.lock();
        let touched = registry.tick();
        let entry = registry
            .entries
            .get_mut(session)
            .ok_or(AuthoringError::UnknownQuestion(question))?;
        entry.touched = touched;
        let slot = entry.session.add_answer(question)?;
        debug!("[会话 {}] 题目 {} 分配选项 {}", session, question, slot.answer);
        Ok(slot)
    }

    /// 重新开始：丢弃该会话，下次添加题目时从 1 开始
    pub fn reset(&self, session: &SessionId) {
        self.lock().entries.remove(session);
    }

    /// 出题结束后释放会话
    pub fn finish(&self, session: &SessionId) -> Option<AuthoringSession> {
        self.lock().entries.remove(session).map(|entry| entry.session)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}
