use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDTO {
    pub port: u16,
    pub db_path: String,
    pub platform: String,
}
