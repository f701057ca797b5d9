pub mod rng;
pub mod validation;
