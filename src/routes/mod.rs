// Route exports
pub mod research;

use actix_web::web;

pub use research::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(research::configure));
}
