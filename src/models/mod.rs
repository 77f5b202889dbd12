pub mod field_key;
pub mod form;
pub mod loaders;
pub mod quiz;

pub use field_key::{FieldKey, FieldKind};
pub use form::{FieldValue, FormFields};
pub use loaders::{load_all_form_files, load_form_fields, parse_form_fields};
pub use quiz::{CorrectAnswers, Question, Quiz};
