use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AuthSettings;
use crate::ucloud::SchoolPortal;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub portal: Arc<dyn SchoolPortal>,
    pub auth: AuthSettings,
}
