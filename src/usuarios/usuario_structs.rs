// src/usuarios/usuario_structs.rs

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::shared::erros::ErroApi;

/// Papel do usuário no sistema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "papel_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PapelUsuario {
    Admin,
    Usuario,
}

/// Estrutura que representa um usuário no banco de dados.
/// O hash da senha nunca sai na serialização.
#[derive(Serialize, FromRow)]
pub struct Usuario {
    pub id: i32,
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub senha_hash: String,
    pub papel: PapelUsuario,
    pub criado_em: DateTime<Utc>,
}

/// Estrutura para receber dados de um novo usuário na requisição de cadastro.
#[derive(Deserialize)]
pub struct NovoUsuario {
    pub nome: String,
    pub email: String,
    pub senha: String, // Senha em texto claro (será hashed antes de salvar)
}

impl NovoUsuario {
    pub fn validar(&self) -> Result<(), ErroApi> {
        if self.nome.trim().is_empty() {
            return Err(ErroApi::Validacao("O nome é obrigatório.".to_string()));
        }
        if !self.email.contains('@') {
            return Err(ErroApi::Validacao("Informe um e-mail válido.".to_string()));
        }
        if self.senha.len() < 6 {
            return Err(ErroApi::Validacao(
                "A senha deve ter pelo menos 6 caracteres.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Estrutura para receber dados de login do usuário.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String, // Senha em texto claro
}

/// Estrutura para o payload do JWT (Claims).
/// Contém informações sobre o usuário e a expiração do token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,            // Subject (ID do usuário)
    pub name: String,        // Nome do usuário
    pub email: String,       // Email do usuário
    pub papel: PapelUsuario, // Papel do usuário
    pub exp: i64,            // Expiration Time (timestamp Unix)
}

impl Claims {
    /// Monta as claims de um usuário com a expiração a partir de agora.
    pub fn para_usuario(usuario: &Usuario, expiracao_horas: i64) -> Self {
        Claims {
            sub: usuario.id,
            name: usuario.nome.clone(),
            email: usuario.email.clone(),
            papel: usuario.papel,
            exp: (Utc::now() + Duration::hours(expiracao_horas)).timestamp(),
        }
    }

    /// Assina o token com a chave secreta da aplicação (HS256).
    pub fn assinar(&self, jwt_secret: &str) -> Result<String, ErroApi> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(jwt_secret.as_ref()),
        )
        .map_err(|e| ErroApi::Interno(format!("Erro ao gerar token: {e}")))
    }
}

/// Estrutura para a resposta de sucesso do cadastro e do login.
#[derive(Serialize)]
pub struct AuthResponse {
    pub status: String,
    pub message: String,
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn usuario_de_teste() -> Usuario {
        Usuario {
            id: 7,
            nome: "Maria".to_string(),
            email: "maria@oficina.com".to_string(),
            senha_hash: String::new(),
            papel: PapelUsuario::Admin,
            criado_em: Utc::now(),
        }
    }

    #[test]
    fn token_assinado_volta_com_as_mesmas_claims() {
        let claims = Claims::para_usuario(&usuario_de_teste(), 8);
        let token = claims.assinar("segredo_de_teste").unwrap();

        let decodificado = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("segredo_de_teste".as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();

        assert_eq!(decodificado.claims.sub, 7);
        assert_eq!(decodificado.claims.name, "Maria");
        assert_eq!(decodificado.claims.email, "maria@oficina.com");
        assert_eq!(decodificado.claims.papel, PapelUsuario::Admin);
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        let mut claims = Claims::para_usuario(&usuario_de_teste(), 8);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = claims.assinar("segredo_de_teste").unwrap();

        let resultado = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("segredo_de_teste".as_ref()),
            &Validation::new(Algorithm::HS256),
        );
        assert!(resultado.is_err());
    }

    #[test]
    fn token_com_outra_chave_e_rejeitado() {
        let claims = Claims::para_usuario(&usuario_de_teste(), 8);
        let token = claims.assinar("segredo_de_teste").unwrap();

        let resultado = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("outra_chave".as_ref()),
            &Validation::new(Algorithm::HS256),
        );
        assert!(resultado.is_err());
    }

    #[test]
    fn senha_curta_e_rejeitada_no_cadastro() {
        let novo = NovoUsuario {
            nome: "Maria".to_string(),
            email: "maria@oficina.com".to_string(),
            senha: "12345".to_string(),
        };
        assert!(matches!(novo.validar(), Err(ErroApi::Validacao(_))));
    }

    #[test]
    fn email_sem_arroba_e_rejeitado_no_cadastro() {
        let novo = NovoUsuario {
            nome: "Maria".to_string(),
            email: "maria.oficina.com".to_string(),
            senha: "123456".to_string(),
        };
        assert!(matches!(novo.validar(), Err(ErroApi::Validacao(_))));
    }

    #[test]
    fn hash_de_senha_confere_apenas_com_a_senha_original() {
        // Custo baixo só para o teste não demorar.
        let hash = bcrypt::hash("minha_senha", 4).unwrap();
        assert!(bcrypt::verify("minha_senha", &hash).unwrap());
        assert!(!bcrypt::verify("outra_senha", &hash).unwrap());
    }
}
