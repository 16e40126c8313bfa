//! Tipos de erro do cliente de polling.
//!
//! Define [`ClientError`] com variantes para job inexistente, falhas de
//! transporte, respostas HTTP inesperadas e timeout de espera. Usa
//! `thiserror` para derivar `Display` e `Error`.

use std::time::Duration;

use thiserror::Error;

use crate::state_machine::JobId;

/// Erros que podem ocorrer ao falar com o servidor de jobs.
///
/// Um status `error` retornado pelo servidor não é um erro aqui: é um
/// resultado de negócio válido e chega pelo caminho de sucesso.
#[derive(Debug, Error)]
pub enum ClientError {
    /// O servidor respondeu 404 para o id consultado. Nunca é retentado.
    #[error("job not found: {job_id}")]
    NotFound { job_id: JobId },

    /// Falha de rede, conexão ou decodificação da resposta.
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Qualquer outro status HTTP fora da faixa de sucesso.
    #[error("unexpected HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    /// O tempo máximo de espera foi excedido antes de um status terminal.
    #[error("job {job_id} timed out after {:.1}s", .elapsed.as_secs_f64())]
    Timeout { job_id: JobId, elapsed: Duration },

    /// URL base inválida para o cliente.
    #[error("invalid base URL '{0}'")]
    InvalidUrl(String),
}

impl ClientError {
    /// Falhas de transporte são as únicas candidatas a retentativa no loop.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Http { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_carries_job_id() {
        let err = ClientError::Timeout {
            job_id: JobId::from("job-1"),
            elapsed: Duration::from_millis(2500),
        };
        assert_eq!(err.to_string(), "job job-1 timed out after 2.5s");
    }

    #[test]
    fn http_error_display() {
        let err = ClientError::Http {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "unexpected HTTP status 503: unavailable");
    }

    #[test]
    fn only_transport_class_errors_are_retryable() {
        assert!(
            ClientError::Http {
                status: 500,
                message: String::new()
            }
            .is_transport()
        );
        assert!(
            !ClientError::NotFound {
                job_id: JobId::from("x")
            }
            .is_transport()
        );
        assert!(
            !ClientError::Timeout {
                job_id: JobId::from("x"),
                elapsed: Duration::ZERO
            }
            .is_transport()
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
