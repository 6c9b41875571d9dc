pub mod analytics_dto;
pub mod application_dto;
pub mod document_dto;
pub mod interview_dto;
pub mod note_dto;
