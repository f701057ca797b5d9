pub mod analytics_service;
pub mod answer_canonicalizer;
pub mod attempt_service;
pub mod exam_assembler;
pub mod exam_service;
pub mod grading_service;
pub mod option_normalizer;
pub mod quota_resolver;
