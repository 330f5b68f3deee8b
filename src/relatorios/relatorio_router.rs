// src/relatorios/relatorio_router.rs

use actix_web::{get, web, HttpResponse};
use bigdecimal::BigDecimal;
use sqlx::query_as;

use super::relatorio_structs::{
    FiltroPeriodo, ProdutoEstoqueBaixo, ResumoDashboard, ResumoVendas, VendaMensal,
};
use crate::produtos::produtos_structs::ContagemCategoria;
use crate::shared::erros::ErroApi;
use crate::shared::shared_structs::GenericResponse;
use crate::usuarios::auth_middleware::UsuarioAutenticado;
use crate::AppState;

/// Rota com os números do dashboard: faturamento do dia, tamanho do
/// catálogo, produtos para repor, faturamento dos últimos meses e as
/// categorias com mais produtos.
///
/// Consultas de leitura pura; nenhuma exige isolamento especial.
#[get("/relatorios/dashboard")]
pub async fn dashboard(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let faturamento_dia: BigDecimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(valor_total), 0) FROM vendas \
         WHERE status_pagamento = 'completed' AND criado_em >= date_trunc('day', now())",
    )
    .fetch_one(&data.db_pool)
    .await?;

    let total_produtos: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM produtos WHERE situacao = 'ativo'")
            .fetch_one(&data.db_pool)
            .await?;

    let estoque_baixo: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM produtos WHERE situacao = 'ativo' AND estoque <= estoque_minimo",
    )
    .fetch_one(&data.db_pool)
    .await?;

    let vendas_mensais = query_as::<_, VendaMensal>(
        "SELECT CAST(EXTRACT(YEAR FROM criado_em) AS INT4) AS ano, \
                CAST(EXTRACT(MONTH FROM criado_em) AS INT4) AS mes, \
                SUM(valor_total) AS total \
         FROM vendas \
         WHERE status_pagamento = 'completed' \
           AND criado_em >= date_trunc('month', now()) - INTERVAL '5 months' \
         GROUP BY 1, 2 ORDER BY 1, 2",
    )
    .fetch_all(&data.db_pool)
    .await?;

    let categorias_top = query_as::<_, ContagemCategoria>(
        "SELECT categoria, COUNT(*) AS quantidade FROM produtos \
         WHERE situacao = 'ativo' GROUP BY categoria ORDER BY quantidade DESC LIMIT 5",
    )
    .fetch_all(&data.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Resumo do dashboard.",
        ResumoDashboard {
            faturamento_dia,
            total_produtos,
            estoque_baixo,
            vendas_mensais,
            categorias_top,
        },
    )))
}

/// Rota com os totais de vendas concluídas em um período opcional
/// (`inicio` e `fim` no formato AAAA-MM-DD, ambos inclusivos).
#[get("/relatorios/vendas")]
pub async fn relatorio_vendas(
    data: web::Data<AppState>,
    filtro: web::Query<FiltroPeriodo>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let resumo = query_as::<_, ResumoVendas>(
        "SELECT COUNT(*) AS quantidade, COALESCE(SUM(valor_total), 0) AS faturamento \
         FROM vendas \
         WHERE status_pagamento = 'completed' \
           AND ($1::date IS NULL OR criado_em >= $1) \
           AND ($2::date IS NULL OR criado_em < $2 + 1)",
    )
    .bind(filtro.inicio)
    .bind(filtro.fim)
    .fetch_one(&data.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Relatório de vendas do período.",
        resumo,
    )))
}

/// Rota com os produtos no nível mínimo de estoque, dos mais críticos
/// para os menos.
#[get("/relatorios/estoque")]
pub async fn relatorio_estoque(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let produtos = query_as::<_, ProdutoEstoqueBaixo>(
        "SELECT id, nome, marca, estoque, estoque_minimo FROM produtos \
         WHERE situacao = 'ativo' AND estoque <= estoque_minimo \
         ORDER BY (estoque - estoque_minimo), nome",
    )
    .fetch_all(&data.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Produtos para reposição.",
        produtos,
    )))
}
