pub mod error;
pub mod rows;
pub mod sqlite;
pub mod store;
pub mod supabase;

use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, DatabaseBackend};

pub use error::DatabaseError;
pub use rows::*;
pub use sqlite::SqliteStore;
pub use store::ClinicStore;
pub use supabase::{SupabaseClient, SupabaseStore};

/// Opens the store selected by `DATABASE_BACKEND`.
pub fn connect(config: &AppConfig) -> Result<Arc<dyn ClinicStore>, DatabaseError> {
    info!("Connecting to {} store", config.database_backend);

    match config.database_backend {
        DatabaseBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&config.database_path)?)),
        DatabaseBackend::Supabase => {
            if !config.is_configured() {
                return Err(DatabaseError::Unavailable(
                    "SUPABASE_URL and SUPABASE_ANON_PUBLIC_KEY are required for the supabase backend"
                        .to_string(),
                ));
            }
            Ok(Arc::new(SupabaseStore::new(config)))
        }
    }
}
