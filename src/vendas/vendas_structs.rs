// src/vendas/vendas_structs.rs

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::shared::erros::ErroApi;

/// Formas de pagamento aceitas no caixa. Os nomes serializados são os
/// mesmos usados pelo front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "forma_pagamento", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FormaPagamento {
    Cash,
    Credit,
    Debit,
    Pix,
    Transfer,
}

/// Status de pagamento de uma venda.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "status_pagamento", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatusPagamento {
    Pending,
    Completed,
    Cancelled,
}

impl StatusPagamento {
    /// Transições permitidas: pending -> completed, pending -> cancelled
    /// e completed -> cancelled. Nenhuma venda volta a um status anterior.
    pub fn pode_transicionar_para(self, novo: StatusPagamento) -> bool {
        use StatusPagamento::*;
        matches!(
            (self, novo),
            (Pending, Completed) | (Pending, Cancelled) | (Completed, Cancelled)
        )
    }
}

impl fmt::Display for StatusPagamento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nome = match self {
            StatusPagamento::Pending => "pending",
            StatusPagamento::Completed => "completed",
            StatusPagamento::Cancelled => "cancelled",
        };
        write!(f, "{nome}")
    }
}

/// Um item pedido pelo caixa: referência ao produto e quantidade desejada.
#[derive(Debug, Deserialize, Clone)]
pub struct ItemNovaVenda {
    pub produto_id: i32,
    pub quantidade: i32,
}

/// Corpo da requisição de criação de venda.
#[derive(Deserialize)]
pub struct NovaVenda {
    pub itens: Vec<ItemNovaVenda>,
    pub cliente: Option<String>,
    pub valor_total: BigDecimal,
    pub forma_pagamento: FormaPagamento,
}

impl NovaVenda {
    /// Validações de entrada, feitas antes de qualquer acesso ao banco.
    pub fn validar(&self) -> Result<(), ErroApi> {
        if self.itens.is_empty() {
            return Err(ErroApi::Validacao(
                "A venda deve conter pelo menos um item.".to_string(),
            ));
        }
        for item in &self.itens {
            if item.quantidade < 1 {
                return Err(ErroApi::Validacao(format!(
                    "Quantidade inválida para o produto {}: deve ser pelo menos 1.",
                    item.produto_id
                )));
            }
        }
        Ok(())
    }

    /// Consolida itens repetidos do mesmo produto somando as quantidades,
    /// preservando a ordem da primeira ocorrência.
    pub fn itens_consolidados(&self) -> Vec<ItemNovaVenda> {
        let mut consolidados: Vec<ItemNovaVenda> = Vec::with_capacity(self.itens.len());
        for item in &self.itens {
            match consolidados
                .iter_mut()
                .find(|c| c.produto_id == item.produto_id)
            {
                Some(existente) => existente.quantidade += item.quantidade,
                None => consolidados.push(item.clone()),
            }
        }
        consolidados
    }
}

/// Um item dentro de uma venda registrada, com nome e preço congelados
/// no momento da venda (o catálogo pode mudar depois).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ItemVenda {
    pub produto_id: i32,
    pub nome: String,
    pub preco_unitario: BigDecimal,
    pub quantidade: i32,
    pub total_item: BigDecimal,
}

/// Estrutura que representa uma venda registrada, já com o nome de quem
/// a criou (JOIN com a tabela de usuários).
#[derive(Serialize, FromRow)]
pub struct Venda {
    pub id: i32,
    pub itens: Json<Vec<ItemVenda>>,
    pub cliente: String,
    pub valor_total: BigDecimal,
    pub forma_pagamento: FormaPagamento,
    pub status_pagamento: StatusPagamento,
    pub criado_por: i32,
    pub criado_por_nome: String,
    pub criado_em: DateTime<Utc>,
}

/// Corpo da requisição de atualização de venda. Só o status de pagamento
/// é mutável depois que a venda existe.
#[derive(Deserialize)]
pub struct AtualizaVenda {
    pub status_pagamento: StatusPagamento,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn formas_de_pagamento_usam_os_valores_do_front() {
        let serializados: Vec<String> = [
            FormaPagamento::Cash,
            FormaPagamento::Credit,
            FormaPagamento::Debit,
            FormaPagamento::Pix,
            FormaPagamento::Transfer,
        ]
        .iter()
        .map(|f| serde_json::to_string(f).unwrap())
        .collect();
        assert_eq!(
            serializados,
            ["\"cash\"", "\"credit\"", "\"debit\"", "\"pix\"", "\"transfer\""]
        );
    }

    #[test]
    fn status_de_pagamento_usa_os_valores_do_front() {
        assert_eq!(
            serde_json::to_string(&StatusPagamento::Pending).unwrap(),
            "\"pending\""
        );
        let status: StatusPagamento = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, StatusPagamento::Cancelled);
    }

    #[test]
    fn transicoes_de_status_seguem_o_grafo() {
        use StatusPagamento::*;

        assert!(Pending.pode_transicionar_para(Completed));
        assert!(Pending.pode_transicionar_para(Cancelled));
        assert!(Completed.pode_transicionar_para(Cancelled));

        // Nada volta para trás, nem repete o próprio status.
        assert!(!Completed.pode_transicionar_para(Pending));
        assert!(!Cancelled.pode_transicionar_para(Pending));
        assert!(!Cancelled.pode_transicionar_para(Completed));
        assert!(!Pending.pode_transicionar_para(Pending));
        assert!(!Completed.pode_transicionar_para(Completed));
        assert!(!Cancelled.pode_transicionar_para(Cancelled));
    }

    fn nova_venda(itens: Vec<ItemNovaVenda>) -> NovaVenda {
        NovaVenda {
            itens,
            cliente: None,
            valor_total: BigDecimal::from_str("10.00").unwrap(),
            forma_pagamento: FormaPagamento::Cash,
        }
    }

    #[test]
    fn venda_sem_itens_e_rejeitada() {
        let venda = nova_venda(vec![]);
        assert!(matches!(venda.validar(), Err(ErroApi::Validacao(_))));
    }

    #[test]
    fn quantidade_menor_que_um_e_rejeitada() {
        let venda = nova_venda(vec![ItemNovaVenda {
            produto_id: 1,
            quantidade: 0,
        }]);
        assert!(matches!(venda.validar(), Err(ErroApi::Validacao(_))));
    }

    #[test]
    fn itens_repetidos_sao_consolidados_preservando_a_ordem() {
        let venda = nova_venda(vec![
            ItemNovaVenda {
                produto_id: 7,
                quantidade: 2,
            },
            ItemNovaVenda {
                produto_id: 3,
                quantidade: 1,
            },
            ItemNovaVenda {
                produto_id: 7,
                quantidade: 5,
            },
        ]);

        let consolidados = venda.itens_consolidados();
        assert_eq!(consolidados.len(), 2);
        assert_eq!(consolidados[0].produto_id, 7);
        assert_eq!(consolidados[0].quantidade, 7);
        assert_eq!(consolidados[1].produto_id, 3);
        assert_eq!(consolidados[1].quantidade, 1);
    }
}
