pub mod application;
pub mod document;
pub mod interview;
pub mod note;
pub mod stage;
