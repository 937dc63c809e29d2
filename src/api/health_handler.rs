use actix_web::{web, HttpResponse};

use super::dtos::response::ok;
use super::dtos::health::HealthDTO;
use crate::config::Config;

/// Reports where the server runs and which store it uses
pub async fn health_check(config: web::Data<Config>) -> HttpResponse {
    ok(
        format!("Deployed (platform: {})", config.platform),
        HealthDTO {
            port: config.port,
            db_path: config.db_path_display(),
            platform: config.platform.name().to_string(),
        },
    )
}
