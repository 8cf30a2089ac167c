use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Filtro inválido: {0}")]
    InvalidFilter(String),

    // A API do Google respondeu com status diferente de 2xx
    #[error("A fonte de dados respondeu {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Erro HTTP: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Credenciais inválidas: {0}")]
    CredentialsError(String),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro de JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais parâmetros são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidFilter(message) => (StatusCode::BAD_REQUEST, message),

            // Falhas de rede/autenticação com o Google viram 502.
            ref e @ (AppError::UpstreamStatus { .. }
            | AppError::HttpError(_)
            | AppError::CredentialsError(_)
            | AppError::JwtError(_)) => {
                tracing::error!("Falha ao buscar a planilha: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }

            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
