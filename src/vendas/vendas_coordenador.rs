// src/vendas/vendas_coordenador.rs

use bigdecimal::BigDecimal;
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Postgres};
use tracing::warn;

use super::vendas_structs::{ItemNovaVenda, ItemVenda, NovaVenda, StatusPagamento, Venda};
use crate::shared::erros::ErroApi;

/// Projeção de um produto com o que a venda precisa: preço e estoque.
#[derive(FromRow)]
struct ProdutoParaVenda {
    id: i32,
    nome: String,
    preco_venda: BigDecimal,
    estoque: i32,
}

/// Projeção de uma venda para o estorno de estoque na exclusão.
#[derive(FromRow)]
struct VendaParaEstorno {
    itens: Json<Vec<ItemVenda>>,
}

/// Coordenador transacional de vendas.
///
/// É o único escritor de estoque ligado a vendas: toda baixa e todo
/// estorno de estoque passam por aqui, sempre dentro de uma transação do
/// banco. Uma venda ou acontece por inteiro (estoque decrementado + venda
/// registrada) ou não acontece; nenhum leitor enxerga estado parcial.
pub struct CoordenadorVendas {
    pool: Pool<Postgres>,
}

impl CoordenadorVendas {
    /// O coordenador recebe o pool na construção (em `main`); não existe
    /// conexão global.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Registra uma venda: valida a disponibilidade de todos os itens,
    /// decrementa os estoques e grava a venda, tudo em uma transação.
    ///
    /// Passos:
    /// 1. Valida a entrada (itens não vazios, quantidades >= 1) e
    ///    consolida itens repetidos.
    /// 2. Abre a transação e busca todos os produtos referenciados em uma
    ///    única leitura com `FOR UPDATE`, em ordem de ID. O bloqueio faz
    ///    vendas concorrentes do mesmo produto serializarem: a perdedora
    ///    relê o estoque já decrementado e falha na validação, nunca há
    ///    duas vendas consumindo a mesma unidade.
    /// 3. Valida em memória: produto existente e estoque suficiente para
    ///    cada item, e o valor total informado contra a soma dos itens.
    /// 4. Decrementa todos os estoques em um único UPDATE em lote e
    ///    insere a venda com nome e preço congelados.
    ///
    /// Qualquer falha antes do commit desfaz a transação inteira.
    pub async fn criar_venda(&self, nova: NovaVenda, criado_por: i32) -> Result<Venda, ErroApi> {
        nova.validar()?;
        let itens_pedido = nova.itens_consolidados();
        let ids: Vec<i32> = itens_pedido.iter().map(|i| i.produto_id).collect();
        let quantidades: Vec<i32> = itens_pedido.iter().map(|i| i.quantidade).collect();

        let mut transacao = self.pool.begin().await?;

        // Leitura em lote com bloqueio das linhas. ORDER BY id mantém a
        // ordem de aquisição dos bloqueios estável entre transações.
        let produtos = sqlx::query_as::<_, ProdutoParaVenda>(
            "SELECT id, nome, preco_venda, estoque FROM produtos \
             WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&ids)
        .fetch_all(&mut *transacao)
        .await?;

        let (itens, total_calculado) = conferir_itens(&produtos, &itens_pedido)?;
        conferir_valor_total(&total_calculado, &nova.valor_total)?;

        sqlx::query(
            "UPDATE produtos p \
             SET estoque = p.estoque - d.quantidade, atualizado_em = now() \
             FROM (SELECT unnest($1::int4[]) AS id, unnest($2::int4[]) AS quantidade) d \
             WHERE p.id = d.id",
        )
        .bind(&ids)
        .bind(&quantidades)
        .execute(&mut *transacao)
        .await?;

        let cliente = nova
            .cliente
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("Cliente Anônimo");

        let venda = sqlx::query_as::<_, Venda>(
            "WITH nova AS ( \
                 INSERT INTO vendas (itens, cliente, valor_total, forma_pagamento, criado_por) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, itens, cliente, valor_total, forma_pagamento, status_pagamento, \
                           criado_por, criado_em \
             ) \
             SELECT nova.id, nova.itens, nova.cliente, nova.valor_total, nova.forma_pagamento, \
                    nova.status_pagamento, nova.criado_por, u.nome AS criado_por_nome, nova.criado_em \
             FROM nova JOIN usuarios u ON u.id = nova.criado_por",
        )
        .bind(Json(&itens))
        .bind(cliente)
        .bind(&nova.valor_total)
        .bind(nova.forma_pagamento)
        .bind(criado_por)
        .fetch_one(&mut *transacao)
        .await?;

        transacao.commit().await?;
        Ok(venda)
    }

    /// Exclui uma venda devolvendo ao estoque as quantidades de cada item,
    /// na mesma transação que remove o registro.
    ///
    /// Se um produto da venda não existe mais no catálogo, o estorno
    /// daquele item é ignorado (com aviso no log) em vez de impedir a
    /// exclusão: a venda precisa continuar excluível mesmo depois que o
    /// produto sumiu.
    pub async fn excluir_venda(&self, venda_id: i32) -> Result<(), ErroApi> {
        let mut transacao = self.pool.begin().await?;

        let venda = sqlx::query_as::<_, VendaParaEstorno>(
            "SELECT itens FROM vendas WHERE id = $1 FOR UPDATE",
        )
        .bind(venda_id)
        .fetch_optional(&mut *transacao)
        .await?
        .ok_or_else(|| ErroApi::NaoEncontrado(format!("Venda com ID {venda_id} não encontrada.")))?;

        let itens = &venda.itens.0;
        let ids: Vec<i32> = itens.iter().map(|i| i.produto_id).collect();
        let quantidades: Vec<i32> = itens.iter().map(|i| i.quantidade).collect();

        // Mesma ordem de bloqueio usada na criação da venda.
        let existentes: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM produtos WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&ids)
        .fetch_all(&mut *transacao)
        .await?;

        for item in itens {
            if !existentes.contains(&item.produto_id) {
                warn!(
                    venda_id,
                    produto_id = item.produto_id,
                    "produto não existe mais no catálogo, estorno de estoque ignorado"
                );
            }
        }

        sqlx::query(
            "UPDATE produtos p \
             SET estoque = p.estoque + d.quantidade, atualizado_em = now() \
             FROM (SELECT unnest($1::int4[]) AS id, unnest($2::int4[]) AS quantidade) d \
             WHERE p.id = d.id",
        )
        .bind(&ids)
        .bind(&quantidades)
        .execute(&mut *transacao)
        .await?;

        sqlx::query("DELETE FROM vendas WHERE id = $1")
            .bind(venda_id)
            .execute(&mut *transacao)
            .await?;

        transacao.commit().await?;
        Ok(())
    }

    /// Atualiza o status de pagamento de uma venda, respeitando o grafo de
    /// transições. Escrita de um único registro, não mexe em estoque.
    pub async fn atualizar_status_pagamento(
        &self,
        venda_id: i32,
        novo_status: StatusPagamento,
    ) -> Result<Venda, ErroApi> {
        let status_atual: StatusPagamento =
            sqlx::query_scalar("SELECT status_pagamento FROM vendas WHERE id = $1")
                .bind(venda_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    ErroApi::NaoEncontrado(format!("Venda com ID {venda_id} não encontrada."))
                })?;

        if !status_atual.pode_transicionar_para(novo_status) {
            return Err(ErroApi::Validacao(format!(
                "Transição de status de pagamento inválida: {status_atual} -> {novo_status}."
            )));
        }

        let venda = sqlx::query_as::<_, Venda>(
            "WITH alterada AS ( \
                 UPDATE vendas SET status_pagamento = $1 WHERE id = $2 \
                 RETURNING id, itens, cliente, valor_total, forma_pagamento, status_pagamento, \
                           criado_por, criado_em \
             ) \
             SELECT alterada.id, alterada.itens, alterada.cliente, alterada.valor_total, \
                    alterada.forma_pagamento, alterada.status_pagamento, alterada.criado_por, \
                    u.nome AS criado_por_nome, alterada.criado_em \
             FROM alterada JOIN usuarios u ON u.id = alterada.criado_por",
        )
        .bind(novo_status)
        .bind(venda_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(venda)
    }
}

/// Confere, em memória, os itens pedidos contra os produtos lidos do banco
/// e monta os itens da venda com nome e preço congelados.
///
/// A conferência segue a ordem dos itens do pedido: o primeiro produto
/// inexistente ou sem estoque interrompe tudo, sem nenhuma mutação.
fn conferir_itens(
    produtos: &[ProdutoParaVenda],
    itens_pedido: &[ItemNovaVenda],
) -> Result<(Vec<ItemVenda>, BigDecimal), ErroApi> {
    let mut itens = Vec::with_capacity(itens_pedido.len());
    let mut total = BigDecimal::from(0);

    for pedido in itens_pedido {
        let produto = produtos
            .iter()
            .find(|p| p.id == pedido.produto_id)
            .ok_or_else(|| {
                ErroApi::NaoEncontrado(format!(
                    "Produto com ID {} não encontrado.",
                    pedido.produto_id
                ))
            })?;

        if produto.estoque < pedido.quantidade {
            return Err(ErroApi::EstoqueInsuficiente {
                produto_id: produto.id,
                nome: produto.nome.clone(),
            });
        }

        let total_item = &produto.preco_venda * &BigDecimal::from(pedido.quantidade);
        total += total_item.clone();
        itens.push(ItemVenda {
            produto_id: produto.id,
            nome: produto.nome.clone(),
            preco_unitario: produto.preco_venda.clone(),
            quantidade: pedido.quantidade,
            total_item,
        });
    }

    Ok((itens, total))
}

/// O valor total informado pelo caixa precisa bater com a soma dos itens
/// no momento da venda.
fn conferir_valor_total(calculado: &BigDecimal, informado: &BigDecimal) -> Result<(), ErroApi> {
    if calculado != informado {
        return Err(ErroApi::Validacao(format!(
            "O valor total informado ({informado}) não confere com a soma dos itens ({calculado})."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn produto(id: i32, nome: &str, preco: &str, estoque: i32) -> ProdutoParaVenda {
        ProdutoParaVenda {
            id,
            nome: nome.to_string(),
            preco_venda: BigDecimal::from_str(preco).unwrap(),
            estoque,
        }
    }

    fn pedido(produto_id: i32, quantidade: i32) -> ItemNovaVenda {
        ItemNovaVenda {
            produto_id,
            quantidade,
        }
    }

    #[test]
    fn itens_sao_congelados_com_nome_e_preco_do_catalogo() {
        let produtos = vec![
            produto(1, "Filtro de óleo", "29.90", 10),
            produto(2, "Pastilha de freio", "120.00", 5),
        ];
        let pedidos = vec![pedido(1, 3), pedido(2, 1)];

        let (itens, total) = conferir_itens(&produtos, &pedidos).unwrap();

        assert_eq!(itens.len(), 2);
        assert_eq!(itens[0].nome, "Filtro de óleo");
        assert_eq!(itens[0].preco_unitario, BigDecimal::from_str("29.90").unwrap());
        assert_eq!(itens[0].quantidade, 3);
        assert_eq!(itens[0].total_item, BigDecimal::from_str("89.70").unwrap());
        assert_eq!(total, BigDecimal::from_str("209.70").unwrap());
    }

    #[test]
    fn produto_inexistente_interrompe_a_venda() {
        let produtos = vec![produto(1, "Filtro de óleo", "29.90", 10)];
        let pedidos = vec![pedido(1, 1), pedido(99, 1)];

        let erro = conferir_itens(&produtos, &pedidos).unwrap_err();
        match erro {
            ErroApi::NaoEncontrado(mensagem) => assert!(mensagem.contains("99")),
            outro => panic!("esperava NaoEncontrado, veio {outro:?}"),
        }
    }

    #[test]
    fn estoque_insuficiente_identifica_o_produto() {
        // Produto com estoque 3 e pedido de 4 unidades.
        let produtos = vec![produto(1, "Correia dentada", "75.00", 3)];
        let pedidos = vec![pedido(1, 4)];

        let erro = conferir_itens(&produtos, &pedidos).unwrap_err();
        match erro {
            ErroApi::EstoqueInsuficiente { produto_id, nome } => {
                assert_eq!(produto_id, 1);
                assert_eq!(nome, "Correia dentada");
            }
            outro => panic!("esperava EstoqueInsuficiente, veio {outro:?}"),
        }
    }

    #[test]
    fn pedido_igual_ao_estoque_e_aceito() {
        let produtos = vec![produto(1, "Vela de ignição", "18.00", 4)];
        let pedidos = vec![pedido(1, 4)];

        assert!(conferir_itens(&produtos, &pedidos).is_ok());
    }

    #[test]
    fn quantidades_congeladas_permitem_estorno_exato() {
        // O que a criação decrementa é exatamente o que a exclusão devolve:
        // as quantidades ficam congeladas nos itens da venda.
        let produtos = vec![
            produto(1, "Filtro de óleo", "29.90", 10),
            produto(2, "Pastilha de freio", "120.00", 5),
        ];
        let pedidos = vec![pedido(1, 3), pedido(2, 2)];

        let (itens, _) = conferir_itens(&produtos, &pedidos).unwrap();
        let devolvidas: Vec<(i32, i32)> =
            itens.iter().map(|i| (i.produto_id, i.quantidade)).collect();
        assert_eq!(devolvidas, vec![(1, 3), (2, 2)]);
    }

    #[test]
    fn valor_total_divergente_e_rejeitado() {
        let calculado = BigDecimal::from_str("209.70").unwrap();
        let informado = BigDecimal::from_str("200.00").unwrap();

        assert!(matches!(
            conferir_valor_total(&calculado, &informado),
            Err(ErroApi::Validacao(_))
        ));
    }

    #[test]
    fn valor_total_igual_passa_mesmo_com_escala_diferente() {
        let calculado = BigDecimal::from_str("89.70").unwrap();
        let informado = BigDecimal::from_str("89.7").unwrap();

        assert!(conferir_valor_total(&calculado, &informado).is_ok());
    }
}
