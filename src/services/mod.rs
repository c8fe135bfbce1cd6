pub mod analytics;
pub mod codegen;
pub mod lifecycle;
pub mod uniqueness;
pub mod validation;
