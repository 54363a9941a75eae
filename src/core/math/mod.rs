pub mod evaluator;
pub mod expression;
pub mod math_service;

pub use math_service::{evaluate, MathOutcome};
