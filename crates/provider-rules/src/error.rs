use crate::config::ConfigError;
use crate::providers::ProviderServiceError;
use crate::roster::RosterImportError;
use crate::rules::{EngineError, RuleServiceError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Json(serde_json::Error),
    Roster(RosterImportError),
    Providers(ProviderServiceError),
    Rules(RuleServiceError),
    Engine(EngineError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Json(err) => write!(f, "invalid JSON: {}", err),
            AppError::Roster(err) => write!(f, "roster error: {}", err),
            AppError::Providers(err) => write!(f, "provider error: {}", err),
            AppError::Rules(err) => write!(f, "rule evaluation error: {}", err),
            AppError::Engine(err) => write!(f, "rule engine error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Roster(err) => Some(err),
            AppError::Providers(err) => Some(err),
            AppError::Rules(err) => Some(err),
            AppError::Engine(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Json(_) | AppError::Roster(_) => StatusCode::BAD_REQUEST,
            AppError::Providers(ProviderServiceError::Fact(_)) => StatusCode::BAD_REQUEST,
            AppError::Providers(ProviderServiceError::Duplicates(_)) => StatusCode::CONFLICT,
            AppError::Providers(
                ProviderServiceError::NotFound(_) | ProviderServiceError::NpiNotFound(_),
            )
            | AppError::Rules(RuleServiceError::ProviderNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Engine(EngineError::NotInitialized) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Providers(_)
            | AppError::Rules(_)
            | AppError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RosterImportError> for AppError {
    fn from(value: RosterImportError) -> Self {
        Self::Roster(value)
    }
}

impl From<ProviderServiceError> for AppError {
    fn from(value: ProviderServiceError) -> Self {
        Self::Providers(value)
    }
}

impl From<RuleServiceError> for AppError {
    fn from(value: RuleServiceError) -> Self {
        Self::Rules(value)
    }
}

impl From<EngineError> for AppError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
