pub mod authoring;
pub mod field_key_parser;
pub mod quiz_builder;
pub mod scoring;
pub mod state_codec;

pub use authoring::{AuthoringSessions, SessionId};
pub use field_key_parser::{FieldKeyParser, ParseMode};
pub use quiz_builder::QuizBuilder;
pub use scoring::{Alignment, Score, ScoringEngine, Submission};
pub use state_codec::{StateCodec, Token};
