pub mod toml_loader;

pub use toml_loader::{load_all_form_files, load_form_fields, parse_form_fields};
