// src/shared/config.rs

use std::{env, fmt::Display, str::FromStr};

use tracing::info;

/// Configuração da aplicação, carregada das variáveis de ambiente na
/// inicialização. Nada aqui é global: a instância é construída em `main`
/// e repassada explicitamente para quem precisa dela.
pub struct Config {
    pub database_url: String,
    pub porta: u16,
    pub jwt_secret: String,
    pub jwt_expiracao_horas: i64,
}

impl Config {
    pub fn carregar() -> Self {
        Self {
            database_url: obrigatoria("DATABASE_URL"),
            porta: com_padrao("PORTA", "8080"),
            jwt_secret: obrigatoria("JWT_SECRET"),
            jwt_expiracao_horas: com_padrao("JWT_EXPIRACAO_HORAS", "8"),
        }
    }
}

/// Lê uma variável de ambiente obrigatória. A aplicação não sobe sem ela.
fn obrigatoria(chave: &str) -> String {
    env::var(chave).unwrap_or_else(|_| panic!("Variável de ambiente {chave} não definida"))
}

/// Lê uma variável de ambiente opcional, usando o valor padrão quando ausente.
fn com_padrao<T: FromStr>(chave: &str, padrao: &str) -> T
where
    T::Err: Display,
{
    let valor = env::var(chave).unwrap_or_else(|_| {
        info!("{chave} não definida, usando padrão: {padrao}");
        padrao.to_string()
    });

    valor
        .parse()
        .unwrap_or_else(|e| panic!("Valor inválido para {chave}: {e}"))
}
