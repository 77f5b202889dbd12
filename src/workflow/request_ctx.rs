//! 请求上下文
//!
//! 封装"这是哪个会话的第几个请求"这一信息，用于日志前缀

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::services::SessionId;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// 请求上下文
#[derive(Debug, Clone)]
pub struct RequestCtx {
    /// 请求编号（仅用于日志显示）
    pub request_id: u64,

    /// 出题会话
    pub session: SessionId,
}

impl RequestCtx {
    /// 创建新的请求上下文，请求编号自动递增
    pub fn new(session: SessionId) -> Self {
        Self {
            request_id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            session,
        }
    }

    /// 无会话的请求（答题、评分）
    pub fn anonymous() -> Self {
        Self::new(SessionId::new("-"))
    }
}

impl Display for RequestCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[请求 #{} 会话 #{}]", self.request_id, self.session)
    }
}
