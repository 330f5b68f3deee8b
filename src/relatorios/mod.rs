// src/relatorios/mod.rs

// Declara o submódulo que contém as definições das structs de relatórios
pub mod relatorio_structs;
// Declara o submódulo que contém as funções de rota relacionadas a relatórios
pub mod relatorio_router;
