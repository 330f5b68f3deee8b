// src/produtos/produtos_structs.rs

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::shared::erros::ErroApi;

/// Categorias de peças aceitas pelo catálogo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "categoria_produto", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoriaProduto {
    Motor,
    Freios,
    Suspensao,
    Transmissao,
    Eletrica,
    Carroceria,
    Arrefecimento,
    Direcao,
    Injecao,
    Escapamento,
    Filtros,
    Acessorios,
    Outros,
}

/// Situação do produto no catálogo. Produtos nunca são removidos
/// fisicamente: "excluir" um produto significa arquivá-lo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "situacao_produto", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SituacaoProduto {
    Ativo,
    Arquivado,
}

/// Estrutura que representa um produto no banco de dados.
/// Deriva FromRow para mapeamento direto de resultados de query SQL.
#[derive(Serialize, FromRow)]
pub struct Produto {
    pub id: i32,
    pub nome: String,
    pub sku: Option<String>,
    pub marca: String,
    pub descricao: String,
    pub categoria: CategoriaProduto,
    pub preco_custo: BigDecimal,
    pub preco_venda: BigDecimal,
    pub estoque: i32,
    pub estoque_minimo: i32,
    pub situacao: SituacaoProduto,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

/// Estrutura para receber dados do novo produto na requisição POST.
#[derive(Deserialize)]
pub struct NovoProduto {
    pub nome: String,
    pub sku: Option<String>,
    pub marca: String,
    #[serde(default)]
    pub descricao: String,
    pub categoria: CategoriaProduto,
    pub preco_custo: BigDecimal,
    pub preco_venda: BigDecimal,
    pub estoque: i32,
    pub estoque_minimo: Option<i32>,
}

impl NovoProduto {
    /// Valida os campos que afetam as invariantes do catálogo antes de
    /// qualquer acesso ao banco.
    pub fn validar(&self) -> Result<(), ErroApi> {
        if self.nome.trim().is_empty() {
            return Err(ErroApi::Validacao(
                "O nome do produto é obrigatório.".to_string(),
            ));
        }
        if self.marca.trim().is_empty() {
            return Err(ErroApi::Validacao(
                "A marca do produto é obrigatória.".to_string(),
            ));
        }
        let zero = BigDecimal::from(0);
        if self.preco_custo < zero || self.preco_venda < zero {
            return Err(ErroApi::Validacao(
                "Os preços do produto não podem ser negativos.".to_string(),
            ));
        }
        if self.estoque < 0 {
            return Err(ErroApi::Validacao(
                "O estoque não pode ser negativo.".to_string(),
            ));
        }
        if self.estoque_minimo.unwrap_or(1) < 0 {
            return Err(ErroApi::Validacao(
                "O estoque mínimo não pode ser negativo.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Estrutura para atualização parcial de um produto. Campos ausentes
/// mantêm o valor atual no banco.
#[derive(Deserialize)]
pub struct AtualizaProduto {
    pub nome: Option<String>,
    pub sku: Option<String>,
    pub marca: Option<String>,
    pub descricao: Option<String>,
    pub categoria: Option<CategoriaProduto>,
    pub preco_custo: Option<BigDecimal>,
    pub preco_venda: Option<BigDecimal>,
    pub estoque: Option<i32>,
    pub estoque_minimo: Option<i32>,
    pub situacao: Option<SituacaoProduto>,
}

impl AtualizaProduto {
    pub fn validar(&self) -> Result<(), ErroApi> {
        let zero = BigDecimal::from(0);
        if let Some(nome) = &self.nome {
            if nome.trim().is_empty() {
                return Err(ErroApi::Validacao(
                    "O nome do produto não pode ficar vazio.".to_string(),
                ));
            }
        }
        if self.preco_custo.as_ref().is_some_and(|p| *p < zero)
            || self.preco_venda.as_ref().is_some_and(|p| *p < zero)
        {
            return Err(ErroApi::Validacao(
                "Os preços do produto não podem ser negativos.".to_string(),
            ));
        }
        if self.estoque.is_some_and(|e| e < 0) {
            return Err(ErroApi::Validacao(
                "O estoque não pode ser negativo.".to_string(),
            ));
        }
        if self.estoque_minimo.is_some_and(|e| e < 0) {
            return Err(ErroApi::Validacao(
                "O estoque mínimo não pode ser negativo.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filtros e paginação para a listagem de produtos, vindos da query string.
#[derive(Deserialize)]
pub struct FiltroProdutos {
    pub categoria: Option<CategoriaProduto>,
    pub nome: Option<String>,
    pub marca: Option<String>,
    pub sku: Option<String>,
    pub pagina: Option<i64>,
    pub limite: Option<i64>,
}

/// Página de produtos com os metadados de paginação.
#[derive(Serialize)]
pub struct PaginaProdutos {
    pub produtos: Vec<Produto>,
    pub total: i64,
    pub pagina: i64,
    pub limite: i64,
    pub paginas: i64,
}

/// Números gerais do catálogo.
#[derive(Serialize, FromRow)]
pub struct EstatisticasGerais {
    pub total_produtos: i64,
    pub valor_estoque: BigDecimal,
    pub abaixo_do_minimo: i64,
}

/// Quantidade de produtos ativos em uma categoria.
#[derive(Serialize, FromRow)]
pub struct ContagemCategoria {
    pub categoria: CategoriaProduto,
    pub quantidade: i64,
}

/// Resposta do endpoint de estatísticas do catálogo.
#[derive(Serialize)]
pub struct EstatisticasProdutos {
    pub geral: EstatisticasGerais,
    pub categorias: Vec<ContagemCategoria>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn produto_valido() -> NovoProduto {
        NovoProduto {
            nome: "Filtro de óleo".to_string(),
            sku: Some("FO-123".to_string()),
            marca: "Mann".to_string(),
            descricao: String::new(),
            categoria: CategoriaProduto::Filtros,
            preco_custo: BigDecimal::from_str("12.50").unwrap(),
            preco_venda: BigDecimal::from_str("29.90").unwrap(),
            estoque: 10,
            estoque_minimo: Some(2),
        }
    }

    #[test]
    fn produto_valido_passa_na_validacao() {
        assert!(produto_valido().validar().is_ok());
    }

    #[test]
    fn preco_negativo_e_rejeitado() {
        let mut produto = produto_valido();
        produto.preco_venda = BigDecimal::from(-1);
        assert!(matches!(produto.validar(), Err(ErroApi::Validacao(_))));
    }

    #[test]
    fn estoque_negativo_e_rejeitado() {
        let mut produto = produto_valido();
        produto.estoque = -3;
        assert!(matches!(produto.validar(), Err(ErroApi::Validacao(_))));
    }

    #[test]
    fn nome_em_branco_e_rejeitado() {
        let mut produto = produto_valido();
        produto.nome = "   ".to_string();
        assert!(matches!(produto.validar(), Err(ErroApi::Validacao(_))));
    }

    #[test]
    fn categoria_usa_os_valores_em_minusculas_no_json() {
        let json = serde_json::to_string(&CategoriaProduto::Suspensao).unwrap();
        assert_eq!(json, "\"suspensao\"");

        let categoria: CategoriaProduto = serde_json::from_str("\"freios\"").unwrap();
        assert_eq!(categoria, CategoriaProduto::Freios);
    }

    #[test]
    fn situacao_usa_os_valores_em_minusculas_no_json() {
        assert_eq!(
            serde_json::to_string(&SituacaoProduto::Arquivado).unwrap(),
            "\"arquivado\""
        );
        let situacao: SituacaoProduto = serde_json::from_str("\"ativo\"").unwrap();
        assert_eq!(situacao, SituacaoProduto::Ativo);
    }
}
