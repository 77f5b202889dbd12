pub mod quiz_flow;
pub mod request_ctx;

pub use quiz_flow::{CreatedQuiz, LoadedQuiz, QuizFlow};
pub use request_ctx::RequestCtx;
