mod blueprint_service;
mod health;

pub use blueprint_service::{BlueprintService, validate_query};
pub use health::{HealthBody, HealthReport, HealthStatus};
