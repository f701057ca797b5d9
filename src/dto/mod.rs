pub mod analytics_dto;
pub mod attempt_dto;
pub mod exam_dto;
