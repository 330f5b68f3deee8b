// src/usuarios/auth_middleware.rs

use actix_web::{dev::Payload, error::ErrorUnauthorized, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::warn;

// Importa as Claims do módulo de structs de usuário
use super::usuario_structs::{Claims, PapelUsuario};
// Importa o AppState do módulo raiz (main.rs)
use crate::AppState;

/// Struct que representa o usuário autenticado, extraída do JWT.
/// Toda rota protegida recebe uma instância dela; é daqui que o
/// coordenador de vendas tira o `criado_por`.
#[derive(Debug, Clone)]
pub struct UsuarioAutenticado {
    pub usuario_id: i32,
    pub nome: String,
    pub email: String,
    pub papel: PapelUsuario,
}

/// Extrator de autenticação para Actix Web.
/// Valida o token JWT presente no cabeçalho Authorization.
impl FromRequest for UsuarioAutenticado {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Acessa o AppState para obter a chave secreta JWT
        let jwt_secret = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.jwt_secret.clone(),
            None => {
                warn!("AppState indisponível no extrator de autenticação");
                return ready(Err(ErrorUnauthorized("Erro de configuração do servidor.")));
            }
        };

        // Tenta obter o cabeçalho "Authorization"
        let token = match req.headers().get("Authorization") {
            Some(header_value) => {
                let header_str = match header_value.to_str() {
                    Ok(s) => s,
                    Err(_) => {
                        return ready(Err(ErrorUnauthorized("Token de autenticação inválido.")))
                    }
                };

                // Verifica se o cabeçalho começa com "Bearer "
                if let Some(token) = header_str.strip_prefix("Bearer ") {
                    token.to_string()
                } else {
                    return ready(Err(ErrorUnauthorized(
                        "Formato de token inválido. Esperado 'Bearer <token>'.",
                    )));
                }
            }
            None => {
                return ready(Err(ErrorUnauthorized("Token de autenticação ausente.")));
            }
        };

        // Decodifica e valida o token (expiração inclusa)
        let token_data = match decode::<Claims>(
            &token,
            &DecodingKey::from_secret(jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(data) => data,
            Err(e) => {
                warn!("token recusado: {e:?}");
                let mensagem = match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token expirado.",
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        "Assinatura do token inválida."
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => "Token malformado.",
                    _ => "Token de autenticação inválido.",
                };
                return ready(Err(ErrorUnauthorized(mensagem)));
            }
        };

        ready(Ok(UsuarioAutenticado {
            usuario_id: token_data.claims.sub,
            nome: token_data.claims.name,
            email: token_data.claims.email,
            papel: token_data.claims.papel,
        }))
    }
}
