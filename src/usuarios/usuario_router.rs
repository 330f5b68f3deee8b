// src/usuarios/usuario_router.rs

use actix_web::{get, post, web, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST}; // Para hashing de senhas
use sqlx::query_as;

// Importa as structs do módulo de usuários
use super::auth_middleware::UsuarioAutenticado;
use super::usuario_structs::{AuthResponse, Claims, LoginRequest, NovoUsuario, Usuario};
use crate::shared::erros::ErroApi;
use crate::shared::shared_structs::GenericResponse;
use crate::AppState;

const COLUNAS_USUARIO: &str = "id, nome, email, senha_hash, papel, criado_em";

/// Rota para cadastrar um novo usuário. Devolve um token já assinado,
/// como o login.
#[post("/usuarios/cadastro")]
pub async fn cadastrar_usuario(
    data: web::Data<AppState>,
    novo_usuario: web::Json<NovoUsuario>,
) -> Result<HttpResponse, ErroApi> {
    novo_usuario.validar()?;

    // 1. Verificar se o e-mail já está em uso
    let sql = format!("SELECT {COLUNAS_USUARIO} FROM usuarios WHERE email = $1");
    let existente = query_as::<_, Usuario>(&sql)
        .bind(&novo_usuario.email)
        .fetch_optional(&data.db_pool)
        .await?;

    if existente.is_some() {
        return Err(ErroApi::Validacao("E-mail já cadastrado.".to_string()));
    }

    // 2. Hash da senha
    let senha_hash = hash(&novo_usuario.senha, DEFAULT_COST)
        .map_err(|e| ErroApi::Interno(format!("Erro ao processar senha: {e}")))?;

    // 3. Inserir o novo usuário no banco de dados
    let sql = format!(
        "INSERT INTO usuarios (nome, email, senha_hash) VALUES ($1, $2, $3) \
         RETURNING {COLUNAS_USUARIO}"
    );
    let usuario = query_as::<_, Usuario>(&sql)
        .bind(&novo_usuario.nome)
        .bind(&novo_usuario.email)
        .bind(&senha_hash)
        .fetch_one(&data.db_pool)
        .await?;

    // 4. Assinar o token de autenticação
    let token = Claims::para_usuario(&usuario, data.jwt_expiracao_horas).assinar(&data.jwt_secret)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        status: "success".to_string(),
        message: format!("Usuário cadastrado com sucesso! ID: {}", usuario.id),
        user_id: usuario.id,
        user_name: usuario.nome,
        user_email: usuario.email,
        token,
    }))
}

/// Rota para login de usuário.
#[post("/usuarios/login")]
pub async fn login_usuario(
    data: web::Data<AppState>,
    login_request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ErroApi> {
    // 1. Buscar o usuário pelo e-mail
    let sql = format!("SELECT {COLUNAS_USUARIO} FROM usuarios WHERE email = $1");
    let usuario = query_as::<_, Usuario>(&sql)
        .bind(&login_request.email)
        .fetch_optional(&data.db_pool)
        .await?
        .ok_or_else(|| ErroApi::NaoAutorizado("Credenciais inválidas.".to_string()))?;

    // 2. Verificar a senha
    let senha_confere = verify(&login_request.senha, &usuario.senha_hash)
        .map_err(|e| ErroApi::Interno(format!("Erro ao verificar senha: {e}")))?;

    if !senha_confere {
        return Err(ErroApi::NaoAutorizado("Credenciais inválidas.".to_string()));
    }

    // 3. Assinar o token de autenticação com a chave da aplicação
    let token = Claims::para_usuario(&usuario, data.jwt_expiracao_horas).assinar(&data.jwt_secret)?;

    // 4. Retornar resposta de sucesso
    Ok(HttpResponse::Ok().json(AuthResponse {
        status: "success".to_string(),
        message: "Login bem-sucedido!".to_string(),
        user_id: usuario.id,
        user_name: usuario.nome,
        user_email: usuario.email,
        token,
    }))
}

/// Rota para consultar o próprio perfil a partir do token.
#[get("/usuarios/perfil")]
pub async fn perfil_usuario(
    data: web::Data<AppState>,
    usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let sql = format!("SELECT {COLUNAS_USUARIO} FROM usuarios WHERE id = $1");
    let registro = query_as::<_, Usuario>(&sql)
        .bind(usuario.usuario_id)
        .fetch_optional(&data.db_pool)
        .await?
        .ok_or_else(|| ErroApi::NaoEncontrado("Usuário não encontrado.".to_string()))?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso("Perfil do usuário.", registro)))
}
