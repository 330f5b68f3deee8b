// src/shared/mod.rs

// Declara o submódulo com as structs compartilhadas entre os módulos
pub mod shared_structs;
// Declara o submódulo de configuração da aplicação (variáveis de ambiente)
pub mod config;
// Declara o submódulo com o tipo de erro da API
pub mod erros;
