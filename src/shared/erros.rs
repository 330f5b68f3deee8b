// src/shared/erros.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use crate::shared::shared_structs::GenericResponse;

/// Erro único da API. Cada variante sabe em qual status HTTP deve ser
/// convertida; os handlers só propagam com `?`.
#[derive(Debug, Error)]
pub enum ErroApi {
    #[error("{0}")]
    NaoEncontrado(String),

    #[error("Estoque insuficiente para o produto {nome} (ID {produto_id}).")]
    EstoqueInsuficiente { produto_id: i32, nome: String },

    #[error("{0}")]
    Validacao(String),

    #[error("{0}")]
    NaoAutorizado(String),

    /// O banco abortou a transação por conflito com outra em andamento.
    /// O chamador pode repetir a operação inteira do zero.
    #[error("A operação conflitou com outra transação. Tente novamente.")]
    ConflitoDeTransacao,

    #[error("Erro ao acessar o banco de dados.")]
    Banco(#[source] sqlx::Error),

    #[error("{0}")]
    Interno(String),
}

/// SQLSTATEs que o PostgreSQL usa para falha de serialização e deadlock.
/// Ambas significam "rode a transação de novo".
fn codigo_indica_conflito(codigo: &str) -> bool {
    codigo == "40001" || codigo == "40P01"
}

impl From<sqlx::Error> for ErroApi {
    fn from(e: sqlx::Error) -> Self {
        if let Some(codigo) = e
            .as_database_error()
            .and_then(|erro_banco| erro_banco.code())
        {
            if codigo_indica_conflito(&codigo) {
                return ErroApi::ConflitoDeTransacao;
            }
        }
        ErroApi::Banco(e)
    }
}

impl ResponseError for ErroApi {
    fn status_code(&self) -> StatusCode {
        match self {
            ErroApi::NaoEncontrado(_) => StatusCode::NOT_FOUND,
            ErroApi::EstoqueInsuficiente { .. } => StatusCode::BAD_REQUEST,
            ErroApi::Validacao(_) => StatusCode::BAD_REQUEST,
            ErroApi::NaoAutorizado(_) => StatusCode::UNAUTHORIZED,
            ErroApi::ConflitoDeTransacao => StatusCode::CONFLICT,
            ErroApi::Banco(_) | ErroApi::Interno(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("erro interno: {self:?}");
        }
        HttpResponse::build(self.status_code()).json(GenericResponse::erro(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cada_variante_mapeia_para_o_status_esperado() {
        assert_eq!(
            ErroApi::NaoEncontrado("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErroApi::EstoqueInsuficiente {
                produto_id: 1,
                nome: "Filtro de óleo".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErroApi::Validacao("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErroApi::NaoAutorizado("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErroApi::ConflitoDeTransacao.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErroApi::Interno("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn estoque_insuficiente_identifica_o_produto_na_mensagem() {
        let erro = ErroApi::EstoqueInsuficiente {
            produto_id: 42,
            nome: "Pastilha de freio".into(),
        };
        let mensagem = erro.to_string();
        assert!(mensagem.contains("Pastilha de freio"));
        assert!(mensagem.contains("42"));
    }

    #[test]
    fn somente_sqlstates_de_conflito_sao_retryaveis() {
        assert!(codigo_indica_conflito("40001"));
        assert!(codigo_indica_conflito("40P01"));
        assert!(!codigo_indica_conflito("23505"));
        assert!(!codigo_indica_conflito("40000"));
    }
}
