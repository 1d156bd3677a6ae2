pub mod note;
pub mod settings;
