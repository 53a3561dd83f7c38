use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    MissingApiKey,
    ModelInitializationFailed,
}

/// Snapshot of the startup preconditions, read on every health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    api_key_configured: bool,
    model_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthBody {
    pub status: String,
}

impl HealthReport {
    pub fn evaluate(api_key_configured: bool, model_ready: bool) -> Self {
        Self {
            api_key_configured,
            model_ready,
        }
    }

    pub fn status(&self) -> HealthStatus {
        if !self.api_key_configured {
            HealthStatus::MissingApiKey
        } else if !self.model_ready {
            HealthStatus::ModelInitializationFailed
        } else {
            HealthStatus::Ok
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status() == HealthStatus::Ok
    }

    pub fn status_text(&self) -> &'static str {
        match self.status() {
            HealthStatus::Ok => "OK",
            HealthStatus::MissingApiKey => "ERROR: Missing GEMINI_API_KEY",
            HealthStatus::ModelInitializationFailed => "ERROR: Model initialization failed",
        }
    }

    pub fn body(&self) -> HealthBody {
        HealthBody {
            status: self.status_text().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HealthReport, HealthStatus};

    #[test]
    fn healthy_when_key_and_model_are_ready() {
        let report = HealthReport::evaluate(true, true);

        assert!(report.is_healthy());
        assert_eq!(report.status_text(), "OK");
    }

    #[test]
    fn missing_key_takes_precedence_over_model_state() {
        let report = HealthReport::evaluate(false, false);

        assert_eq!(report.status(), HealthStatus::MissingApiKey);
        assert_eq!(report.body().status, "ERROR: Missing GEMINI_API_KEY");
    }

    #[test]
    fn reports_model_initialization_failure() {
        let report = HealthReport::evaluate(true, false);

        assert!(!report.is_healthy());
        assert_eq!(report.status_text(), "ERROR: Model initialization failed");
    }
}
