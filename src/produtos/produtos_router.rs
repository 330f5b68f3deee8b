// src/produtos/produtos_router.rs

use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::query_as;

// Importa as structs definidas no módulo `produtos_structs` dentro da mesma pasta `produtos`
use super::produtos_structs::{
    AtualizaProduto, ContagemCategoria, EstatisticasGerais, EstatisticasProdutos, FiltroProdutos,
    NovoProduto, PaginaProdutos, Produto,
};
use crate::shared::erros::ErroApi;
use crate::shared::shared_structs::GenericResponse;
use crate::usuarios::auth_middleware::UsuarioAutenticado;
use crate::AppState;

const COLUNAS_PRODUTO: &str = "id, nome, sku, marca, descricao, categoria, preco_custo, \
     preco_venda, estoque, estoque_minimo, situacao, criado_em, atualizado_em";

/// Rota para listar os produtos ativos do catálogo.
///
/// Aceita filtros opcionais por categoria, nome, marca e SKU, além de
/// paginação via `pagina` e `limite`. Produtos arquivados ficam de fora.
#[get("/produtos")]
pub async fn buscar_produtos(
    data: web::Data<AppState>,
    filtro: web::Query<FiltroProdutos>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let limite = filtro.limite.unwrap_or(100).clamp(1, 500);
    let pagina = filtro.pagina.unwrap_or(1).max(1);
    let deslocamento = (pagina - 1) * limite;

    let sql = format!(
        "SELECT {COLUNAS_PRODUTO} FROM produtos \
         WHERE situacao = 'ativo' \
           AND ($1::categoria_produto IS NULL OR categoria = $1) \
           AND ($2::text IS NULL OR nome ILIKE '%' || $2 || '%') \
           AND ($3::text IS NULL OR marca ILIKE '%' || $3 || '%') \
           AND ($4::text IS NULL OR sku ILIKE '%' || $4 || '%') \
         ORDER BY nome \
         LIMIT $5 OFFSET $6"
    );
    let produtos = query_as::<_, Produto>(&sql)
        .bind(filtro.categoria)
        .bind(&filtro.nome)
        .bind(&filtro.marca)
        .bind(&filtro.sku)
        .bind(limite)
        .bind(deslocamento)
        .fetch_all(&data.db_pool)
        .await?;

    // Total sem paginação, para o cliente montar os controles de página.
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM produtos \
         WHERE situacao = 'ativo' \
           AND ($1::categoria_produto IS NULL OR categoria = $1) \
           AND ($2::text IS NULL OR nome ILIKE '%' || $2 || '%') \
           AND ($3::text IS NULL OR marca ILIKE '%' || $3 || '%') \
           AND ($4::text IS NULL OR sku ILIKE '%' || $4 || '%')",
    )
    .bind(filtro.categoria)
    .bind(&filtro.nome)
    .bind(&filtro.marca)
    .bind(&filtro.sku)
    .fetch_one(&data.db_pool)
    .await?;

    let pagina_produtos = PaginaProdutos {
        produtos,
        total,
        pagina,
        limite,
        paginas: (total + limite - 1) / limite,
    };

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Produtos listados com sucesso!",
        pagina_produtos,
    )))
}

/// Rota para as estatísticas do catálogo: totais, valor em estoque,
/// produtos no nível mínimo e contagem por categoria.
#[get("/produtos/estatisticas")]
pub async fn estatisticas_produtos(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let geral = query_as::<_, EstatisticasGerais>(
        "SELECT COUNT(*) AS total_produtos, \
                COALESCE(SUM(preco_venda * estoque), 0) AS valor_estoque, \
                COUNT(*) FILTER (WHERE estoque <= estoque_minimo) AS abaixo_do_minimo \
         FROM produtos WHERE situacao = 'ativo'",
    )
    .fetch_one(&data.db_pool)
    .await?;

    let categorias = query_as::<_, ContagemCategoria>(
        "SELECT categoria, COUNT(*) AS quantidade FROM produtos \
         WHERE situacao = 'ativo' GROUP BY categoria ORDER BY quantidade DESC",
    )
    .fetch_all(&data.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Estatísticas do catálogo.",
        EstatisticasProdutos { geral, categorias },
    )))
}

/// Rota para buscar um produto por ID, inclusive arquivados.
#[get("/produtos/{id}")]
pub async fn buscar_produto_por_id(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let id = path.into_inner();
    let sql = format!("SELECT {COLUNAS_PRODUTO} FROM produtos WHERE id = $1");
    let produto = query_as::<_, Produto>(&sql)
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await?
        .ok_or_else(|| ErroApi::NaoEncontrado(format!("Produto com ID {id} não encontrado.")))?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        format!("Produto com ID {id} encontrado."),
        produto,
    )))
}

/// Rota para inserir um novo produto no catálogo.
#[post("/produtos")]
pub async fn cadastrar_produto(
    data: web::Data<AppState>,
    item: web::Json<NovoProduto>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    item.validar()?;

    let sql = format!(
        "INSERT INTO produtos \
             (nome, sku, marca, descricao, categoria, preco_custo, preco_venda, estoque, estoque_minimo) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {COLUNAS_PRODUTO}"
    );
    let produto = query_as::<_, Produto>(&sql)
        .bind(&item.nome)
        .bind(&item.sku)
        .bind(&item.marca)
        .bind(&item.descricao)
        .bind(item.categoria)
        .bind(&item.preco_custo)
        .bind(&item.preco_venda)
        .bind(item.estoque)
        .bind(item.estoque_minimo.unwrap_or(1))
        .fetch_one(&data.db_pool)
        .await?;

    Ok(HttpResponse::Created().json(GenericResponse::sucesso(
        format!("Produto cadastrado com sucesso! ID: {}", produto.id),
        produto,
    )))
}

/// Rota para atualizar um produto. Campos ausentes no corpo mantêm o
/// valor atual; `atualizado_em` é sempre carimbado.
#[put("/produtos/{id}")]
pub async fn atualizar_produto(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    item: web::Json<AtualizaProduto>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    item.validar()?;

    let id = path.into_inner();
    let sql = format!(
        "UPDATE produtos SET \
             nome = COALESCE($1, nome), \
             sku = COALESCE($2, sku), \
             marca = COALESCE($3, marca), \
             descricao = COALESCE($4, descricao), \
             categoria = COALESCE($5, categoria), \
             preco_custo = COALESCE($6, preco_custo), \
             preco_venda = COALESCE($7, preco_venda), \
             estoque = COALESCE($8, estoque), \
             estoque_minimo = COALESCE($9, estoque_minimo), \
             situacao = COALESCE($10, situacao), \
             atualizado_em = now() \
         WHERE id = $11 \
         RETURNING {COLUNAS_PRODUTO}"
    );
    let produto = query_as::<_, Produto>(&sql)
        .bind(&item.nome)
        .bind(&item.sku)
        .bind(&item.marca)
        .bind(&item.descricao)
        .bind(item.categoria)
        .bind(&item.preco_custo)
        .bind(&item.preco_venda)
        .bind(item.estoque)
        .bind(item.estoque_minimo)
        .bind(item.situacao)
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await?
        .ok_or_else(|| ErroApi::NaoEncontrado(format!("Produto com ID {id} não encontrado.")))?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        format!("Produto com ID {id} atualizado com sucesso!"),
        produto,
    )))
}

/// Rota para arquivar um produto. Nada é apagado do banco: vendas antigas
/// continuam referenciando o produto pelo ID.
#[delete("/produtos/{id}")]
pub async fn arquivar_produto(
    data: web::Data<AppState>,
    path: web::Path<i32>,
    _usuario: UsuarioAutenticado,
) -> Result<HttpResponse, ErroApi> {
    let id = path.into_inner();
    let arquivado: Option<i32> = sqlx::query_scalar(
        "UPDATE produtos SET situacao = 'arquivado', atualizado_em = now() \
         WHERE id = $1 RETURNING id",
    )
    .bind(id)
    .fetch_optional(&data.db_pool)
    .await?;

    if arquivado.is_none() {
        return Err(ErroApi::NaoEncontrado(format!(
            "Produto com ID {id} não encontrado."
        )));
    }

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso_sem_corpo(format!(
        "Produto com ID {id} arquivado com sucesso!"
    ))))
}
