//! Forward-evaluation rule engine over provider fact sets.

mod duplicate_detection;
pub mod engine;
pub mod evaluation;
pub mod facts;
mod license_expiry;
pub mod registry;
pub mod router;
pub mod rule;
pub mod service;

#[cfg(test)]
mod tests;

pub use duplicate_detection::RULE_NAME as DUPLICATE_DETECTION_RULE;
pub use engine::{EngineError, RuleEngine, RulePass};
pub use evaluation::{EvaluationMetadata, EvaluationRequest, EvaluationResponse};
pub use facts::FactSet;
pub use license_expiry::RULE_NAME as LICENSE_EXPIRY_RULE;
pub use registry::{standard_definitions, RegistryError, RuleDefinition, RuleRegistry};
pub use router::rule_router;
pub use rule::{
    BuiltinRule, RuleError, RuleFiring, RuleResult, SEVERITY_HIGH, SEVERITY_LOW, SEVERITY_MEDIUM,
};
pub use service::{RuleEvaluationService, RuleServiceError};
