use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use opensplit::routes::{self, AppState};
use opensplit::settings::{Database, Settings};
use opensplit::store::{DataSource, ExpenseStore, MemoryStore, MongoStore};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "opensplit={level},actix_web={level}",
            level = settings.app.level
        ))
        .init();

    let store = open_store(&settings.database).await?;
    let state = web::Data::new(AppState {
        store,
        settlement: settings.settlement,
    });
    tracing::info!(
        epsilon = %settings.settlement.epsilon,
        tie_break = ?settings.settlement.tie_break,
        "settlement configured"
    );

    let origins = settings.server.allowed_origins.clone();
    let bind = (settings.server.host.clone(), settings.server.port);
    tracing::info!("listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = if origins.is_empty() {
            Cors::permissive()
        } else {
            origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allow_any_method()
                .allow_any_header()
        };
        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

async fn open_store(config: &Database) -> Result<ExpenseStore, Box<dyn std::error::Error>> {
    match config.source {
        DataSource::Mongo => {
            let uri = config
                .uri
                .as_deref()
                .ok_or("set MONGODB_URI or database.uri to use the mongo data source")?;
            tracing::info!("using mongodb database {}", config.name);
            Ok(ExpenseStore::Mongo(MongoStore::connect(uri, &config.name).await?))
        }
        DataSource::Memory => {
            tracing::warn!("using the in-memory data source, nothing will be persisted");
            let store = if config.seed_sample_data {
                MemoryStore::with_sample_data()
            } else {
                MemoryStore::new()
            };
            Ok(ExpenseStore::Memory(store))
        }
    }
}
