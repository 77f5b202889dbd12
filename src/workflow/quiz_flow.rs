//! 测验流程 - 流程层
//!
//! 核心职责：定义对外的四个操作
//!
//! 1. create：出题表单 → 令牌（重定向地址）
//! 2. load：令牌 → 测验（供页面渲染）+ 原令牌
//! 3. add_question / add_answer：为出题页面分配序号
//! 4. check：答题表单 + 令牌 → 分数

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{CorrectAnswers, FormFields, Quiz};
use crate::services::authoring::AnswerSlot;
use crate::services::quiz_builder::BuildWarning;
use crate::services::scoring::{parse_legacy_reference, score_positional};
use crate::services::{
    AuthoringSessions, QuizBuilder, Score, ScoringEngine, StateCodec, Submission, Token,
};
use crate::utils::truncate_text;
use crate::workflow::request_ctx::RequestCtx;

/// create 的结果
#[derive(Debug, Clone)]
pub struct CreatedQuiz {
    pub token: Token,
    /// 答题页面地址，如 `/quiz?data=<token>`
    pub redirect: String,
    pub question_count: usize,
    pub warnings: Vec<BuildWarning>,
}

/// load 的结果
#[derive(Debug, Clone)]
pub struct LoadedQuiz {
    pub quiz: Quiz,
    /// 原样保留，评分时回传
    pub token: String,
}

/// 测验流程
///
/// - 不保存任何测验内容，测验只存在于令牌中
/// - 出题序号按会话隔离
pub struct QuizFlow {
    builder: QuizBuilder,
    codec: StateCodec,
    scoring: ScoringEngine,
    sessions: AuthoringSessions,
    quiz_route: String,
    verbose_logging: bool,
}

impl QuizFlow {
    /// 创建新的测验流程
    pub fn new(config: &Config) -> Self {
        Self {
            builder: QuizBuilder::new(config.parse_mode()),
            codec: StateCodec::from_config(config),
            scoring: ScoringEngine::new(config.scoring_alignment),
            sessions: AuthoringSessions::with_capacity(config.max_authoring_sessions),
            quiz_route: config.quiz_route.clone(),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 出题：表单 → 令牌
    ///
    /// 成功后释放该会话的序号状态
    pub fn create(&self, ctx: &RequestCtx, form: &FormFields) -> AppResult<CreatedQuiz> {
        info!("{} 📝 收到出题表单, {} 个字段", ctx, form.len());

        let report = self.builder.build(form)?;
        for warning in &report.warnings {
            warn!("{} ⚠️ {}", ctx, warning);
        }
        if self.verbose_logging {
            self.log_quiz(ctx, &report.quiz);
        }

        let token = self.codec.encode(&report.quiz)?;
        let redirect = token.redirect_target(&self.quiz_route);
        self.sessions.finish(&ctx.session);

        info!(
            "{} ✓ 测验 '{}' 已生成令牌: {} 道题, {} 字符",
            ctx,
            truncate_text(&report.quiz.title, 40),
            report.quiz.question_count(),
            token.as_str().len()
        );

        Ok(CreatedQuiz {
            question_count: report.quiz.question_count(),
            token,
            redirect,
            warnings: report.warnings,
        })
    }

    /// 答题页面：令牌 → 测验
    pub fn load(&self, ctx: &RequestCtx, token: &str) -> AppResult<LoadedQuiz> {
        let quiz = match self.codec.decode(token) {
            Ok(quiz) => quiz,
            Err(e) => {
                warn!("{} ❌ 令牌无法解析: {}", ctx, e);
                return Err(e.into());
            }
        };

        info!(
            "{} ✓ 已加载测验 '{}': {} 道题",
            ctx,
            truncate_text(&quiz.title, 40),
            quiz.question_count()
        );

        Ok(LoadedQuiz {
            quiz,
            token: token.to_string(),
        })
    }

    /// 出题页面添加题目，返回新题号
    pub fn add_question(&self, ctx: &RequestCtx) -> u32 {
        self.sessions.add_question(&ctx.session)
    }

    /// 出题页面添加选项，返回新选项序号
    pub fn add_answer(&self, ctx: &RequestCtx, question: u32) -> AppResult<AnswerSlot> {
        Ok(self.sessions.add_answer(&ctx.session, question)?)
    }

    /// 重新打开出题页面
    pub fn reset_session(&self, ctx: &RequestCtx) {
        debug!("{} 重置出题序号", ctx);
        self.sessions.reset(&ctx.session);
    }

    /// 评分：答题表单 + 令牌 → 分数
    ///
    /// 令牌无法解析时返回错误；评分本身不会失败。
    pub fn check(&self, ctx: &RequestCtx, form: &FormFields, token: &str) -> AppResult<Score> {
        let quiz = self.load(ctx, token)?.quiz;
        Ok(self.score(ctx, form, &quiz.correct_answers))
    }

    /// 按给定的正确答案评分
    pub fn score(&self, ctx: &RequestCtx, form: &FormFields, reference: &CorrectAnswers) -> Score {
        let submission = Submission::from_form(form);
        let score = self.scoring.score(&submission, reference);
        info!(
            "{} 📊 评分完成: {}/{} → {}",
            ctx, score.correct, score.submitted, score
        );
        score
    }

    /// 旧页面回传的 `[1 2 3]` 形式参考答案
    ///
    /// 只能逐位比较；参考答案无法解析时按空参考答案计分。
    pub fn check_with_legacy_reference(
        &self,
        ctx: &RequestCtx,
        form: &FormFields,
        raw_reference: &str,
    ) -> Score {
        let reference = parse_legacy_reference(raw_reference).unwrap_or_else(|e| {
            warn!("{} ⚠️ {}", ctx, e);
            Vec::new()
        });
        let submission = Submission::from_form(form);
        let score = score_positional(&submission.sequence(), &reference);
        info!(
            "{} 📊 评分完成(旧格式): {}/{} → {}",
            ctx, score.correct, score.submitted, score
        );
        score
    }

    // ========== 日志辅助方法 ==========

    fn log_quiz(&self, ctx: &RequestCtx, quiz: &Quiz) {
        for question in &quiz.questions {
            info!(
                "{}   {}. {} ({} 个选项, 正确答案: {:?})",
                ctx,
                question.number,
                truncate_text(&question.title, 60),
                question.answers.len(),
                question.correct_answer
            );
        }
    }
}
