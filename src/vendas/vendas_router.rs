// src/vendas/vendas_router.rs

use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::query_as;

// Importa as structs de vendas (NovaVenda, AtualizaVenda, Venda)
use super::vendas_structs::{AtualizaVenda, NovaVenda, Venda};
use crate::shared::erros::ErroApi;
use crate::shared::shared_structs::GenericResponse;
use crate::usuarios::auth_middleware::UsuarioAutenticado;
use crate::AppState;

/// Colunas de toda leitura de venda, já com o nome de quem criou.
const SELECT_VENDA: &str = "SELECT v.id, v.itens, v.cliente, v.valor_total, v.forma_pagamento, \
     v.status_pagamento, v.criado_por, u.nome AS criado_por_nome, v.criado_em \
     FROM vendas v JOIN usuarios u ON u.id = v.criado_por";

/// Rota para registrar uma venda.
///
/// A validação de estoque, a baixa das quantidades e a gravação da venda
/// acontecem dentro de uma única transação no coordenador; aqui só
/// entram a identidade do caixa autenticado e o corpo da requisição.
#[post("/vendas")]
pub async fn realizar_venda(
    data: web::Data<AppState>,
    nova_venda: web::Json<NovaVenda>,
    usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let venda = data
        .coordenador
        .criar_venda(nova_venda.into_inner(), usuario.usuario_id)
        .await?;

    Ok(HttpResponse::Created().json(GenericResponse::sucesso(
        "Venda realizada com sucesso!",
        venda,
    )))
}

/// Rota para listar as vendas, da mais recente para a mais antiga.
#[get("/vendas")]
pub async fn buscar_vendas(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let sql = format!("{SELECT_VENDA} ORDER BY v.criado_em DESC, v.id DESC");
    let vendas = query_as::<_, Venda>(&sql).fetch_all(&data.db_pool).await?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Vendas listadas com sucesso!",
        vendas,
    )))
}

/// Rota para buscar uma venda por ID.
#[get("/vendas/{id}")]
pub async fn buscar_venda_por_id(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let id = path.into_inner();
    let sql = format!("{SELECT_VENDA} WHERE v.id = $1");
    let venda = query_as::<_, Venda>(&sql)
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await?
        .ok_or_else(|| ErroApi::NaoEncontrado(format!("Venda com ID {id} não encontrada.")))?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        format!("Venda com ID {id} encontrada."),
        venda,
    )))
}

/// Rota para atualizar o status de pagamento de uma venda. Nenhum outro
/// campo de uma venda registrada é mutável.
#[put("/vendas/{id}")]
pub async fn atualizar_venda(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    corpo: web::Json<AtualizaVenda>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let id = path.into_inner();
    let venda = data
        .coordenador
        .atualizar_status_pagamento(id, corpo.status_pagamento)
        .await?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        format!("Status de pagamento da venda {id} atualizado."),
        venda,
    )))
}

/// Rota para excluir uma venda, devolvendo os itens ao estoque.
#[delete("/vendas/{id}")]
pub async fn excluir_venda(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let id = path.into_inner();
    data.coordenador.excluir_venda(id).await?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso_sem_corpo(format!(
        "Venda com ID {id} excluída e estoque restaurado."
    ))))
}
