pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use crate::config::Config;
use crate::services::{
    analytics_service::AnalyticsService, attempt_service::AttemptService,
    exam_service::ExamService,
};
use crate::store::{AttemptStore, ExamStore, InMemoryStore, QuestionBank};
use crate::utils::rng::{shared_rng, SharedRng};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryStore>,
    pub exam_service: ExamService,
    pub attempt_service: AttemptService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub fn new(store: Arc<InMemoryStore>, config: &Config) -> Self {
        Self::with_rng(store, shared_rng(config.rng_seed), config.default_score)
    }

    pub fn with_rng(store: Arc<InMemoryStore>, rng: SharedRng, default_score: i32) -> Self {
        let bank: Arc<dyn QuestionBank> = store.clone();
        let exams: Arc<dyn ExamStore> = store.clone();
        let attempts: Arc<dyn AttemptStore> = store.clone();

        let exam_service = ExamService::new(bank.clone(), exams.clone(), rng.clone(), default_score);
        let attempt_service =
            AttemptService::new(bank.clone(), exams.clone(), attempts.clone(), rng);
        let analytics_service = AnalyticsService::new(bank, exams, attempts);

        Self {
            store,
            exam_service,
            attempt_service,
            analytics_service,
        }
    }
}
