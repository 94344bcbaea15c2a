use quill_server::infrastructure::config::AppConfig;
use quill_server::infrastructure::database::{create_pool, run_migrations};
use quill_server::infrastructure::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    quill_server::serve(config, pool).await
}
