// src/relatorios/relatorio_structs.rs

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::produtos::produtos_structs::ContagemCategoria;

/// Faturamento de um mês do gráfico do dashboard.
#[derive(Serialize, FromRow)]
pub struct VendaMensal {
    pub ano: i32,
    pub mes: i32,
    pub total: BigDecimal,
}

/// Números do dashboard da loja.
#[derive(Serialize)]
pub struct ResumoDashboard {
    pub faturamento_dia: BigDecimal,
    pub total_produtos: i64,
    pub estoque_baixo: i64,
    pub vendas_mensais: Vec<VendaMensal>,
    pub categorias_top: Vec<ContagemCategoria>,
}

/// Intervalo opcional de datas para o relatório de vendas (inclusivo).
#[derive(Deserialize)]
pub struct FiltroPeriodo {
    pub inicio: Option<NaiveDate>,
    pub fim: Option<NaiveDate>,
}

/// Totais de vendas concluídas no período pedido.
#[derive(Serialize, FromRow)]
pub struct ResumoVendas {
    pub quantidade: i64,
    pub faturamento: BigDecimal,
}

/// Produto no nível mínimo de estoque (ou abaixo), para reposição.
#[derive(Serialize, FromRow)]
pub struct ProdutoEstoqueBaixo {
    pub id: i32,
    pub nome: String,
    pub marca: String,
    pub estoque: i32,
    pub estoque_minimo: i32,
}
