// src/main.rs

use actix_web::{get, web, App, HttpResponse, HttpServer};
use sqlx::{Pool, Postgres};
use tracing::info;
use tracing_subscriber::EnvFilter;

// Importa os módulos
mod produtos; // Módulo de produtos (catálogo de peças)
mod relatorios; // Módulo de relatórios
mod shared; // Módulo shared
mod usuarios; // Módulo de usuários
mod vendas; // Módulo de vendas

use shared::config::Config;
use shared::shared_structs::GenericResponse;
use vendas::vendas_coordenador::CoordenadorVendas;

/// Estado compartilhado da aplicação: pool de conexões, chave JWT e o
/// coordenador de vendas. Tudo é montado aqui em `main` a partir da
/// configuração e entregue às rotas via `web::Data`, sem globais.
pub struct AppState {
    pub db_pool: Pool<Postgres>,
    pub jwt_secret: String,
    pub jwt_expiracao_horas: i64,
    pub coordenador: CoordenadorVendas,
}

/// Rota de verificação de status da API.
#[get("/status")]
async fn status() -> HttpResponse {
    HttpResponse::Ok().json(GenericResponse::sucesso_sem_corpo(
        "API funcionando corretamente!",
    ))
}

// Função principal da aplicação Actix Web.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::carregar();

    // Conecta ao banco de dados PostgreSQL usando um pool de conexões.
    let db_pool = Pool::<Postgres>::connect(&config.database_url)
        .await
        .expect("Falha ao conectar ao banco PostgreSQL");

    // Aplica as migrações pendentes antes de aceitar requisições.
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .expect("Falha ao aplicar as migrações do banco");

    let app_state = web::Data::new(AppState {
        coordenador: CoordenadorVendas::new(db_pool.clone()),
        db_pool,
        jwt_secret: config.jwt_secret,
        jwt_expiracao_horas: config.jwt_expiracao_horas,
    });

    info!("Iniciando API de autopeças na porta {}", config.porta);

    // Configura e inicia o servidor HTTP.
    HttpServer::new(move || {
        App::new()
            // Adiciona o estado compartilhado à aplicação.
            .app_data(app_state.clone())
            .service(status)
            // Módulo de Produtos
            // (a rota de estatísticas vem antes da rota com {id})
            .service(produtos::produtos_router::estatisticas_produtos)
            .service(produtos::produtos_router::buscar_produtos)
            .service(produtos::produtos_router::buscar_produto_por_id)
            .service(produtos::produtos_router::cadastrar_produto)
            .service(produtos::produtos_router::atualizar_produto)
            .service(produtos::produtos_router::arquivar_produto)
            // Módulo de Vendas
            .service(vendas::vendas_router::realizar_venda)
            .service(vendas::vendas_router::buscar_vendas)
            .service(vendas::vendas_router::buscar_venda_por_id)
            .service(vendas::vendas_router::atualizar_venda)
            .service(vendas::vendas_router::excluir_venda)
            // Módulo de Usuários
            .service(usuarios::usuario_router::cadastrar_usuario)
            .service(usuarios::usuario_router::login_usuario)
            .service(usuarios::usuario_router::perfil_usuario)
            // Módulo de Relatórios
            .service(relatorios::relatorio_router::dashboard)
            .service(relatorios::relatorio_router::relatorio_vendas)
            .service(relatorios::relatorio_router::relatorio_estoque)
    })
    // Vincula o servidor ao endereço IP e porta. O '?' propaga erros.
    .bind(("0.0.0.0", config.porta))?
    // Inicia o servidor.
    .run()
    // Aguarda a finalização do servidor.
    .await
}
