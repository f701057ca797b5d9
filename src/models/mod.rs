pub mod answer;
pub mod attempt;
pub mod exam;
pub mod identity;
pub mod option;
pub mod question;
pub mod snapshot;
