mod catalog;
mod config;
mod error;
mod identity;
mod reports;
mod services;
mod storage;
#[cfg(test)]
mod test_support;

use crate::catalog::SqliteEventCatalog;
use crate::config::AppConfig;
use crate::error::ReportError;
use crate::reports::compose::DocumentComposer;
use crate::reports::registry::ReportRegistry;
use crate::reports::service::ReportService;
use crate::reports::template::TemplateProvider;
use crate::storage::artifacts::FsReportStore;
use crate::storage::database;
use crate::storage::media::FsMediaStore;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::sync::Arc;

/// Wires the report service from configuration.
///
/// The catalog and the registry each get their own connection to the same
/// database file.
fn build_service(config: &AppConfig) -> Result<ReportService, ReportError> {
    let catalog = SqliteEventCatalog::new(database::open(&config.database_path)?);
    let registry = ReportRegistry::new(database::open(&config.database_path)?);

    let templates = TemplateProvider::new(&config.template_path);
    // Not fatal: the template may be uploaded after startup.
    match templates.load() {
        Ok(template) => info!("Using report template {}", template.path().display()),
        Err(e) => warn!("{}", e),
    }

    let composer = DocumentComposer::new(Arc::new(FsMediaStore::new(&config.media_root)));
    Ok(ReportService::new(
        Arc::new(catalog),
        templates,
        composer,
        Arc::new(FsReportStore),
        registry,
        &config.reports_dir,
    ))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let service = build_service(&config).map_err(|e| io::Error::other(e.to_string()))?;
    let service = web::Data::new(service);

    info!(
        "Reports are written to {}, media is read from {}",
        config.reports_dir.display(),
        config.media_root.display()
    );
    info!("Server running at http://{}", config.bind_address());

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .service(services::reports::configure_routes())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
