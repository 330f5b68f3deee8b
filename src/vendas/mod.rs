// src/vendas/mod.rs

// Declara o submódulo que contém as definições das structs de vendas
pub mod vendas_structs;
// Declara o submódulo com o coordenador transacional de vendas
pub mod vendas_coordenador;
// Declara o submódulo que contém as funções de rota relacionadas a vendas
pub mod vendas_router;
