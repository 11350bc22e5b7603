//! Record store selection and the shared intake pipeline.

use std::sync::Arc;

use intake_infra::{
    InMemoryRecordStore, InvoiceIntake, PostgresRecordStore, RecordStore, StoreResult,
};

use crate::config::AppConfig;

/// Intake pipeline over whichever backend was configured.
pub type SharedIntake = InvoiceIntake<Arc<dyn RecordStore>>;

pub enum AppServices {
    InMemory {
        intake: SharedIntake,
        store: InMemoryRecordStore,
    },
    Postgres {
        intake: SharedIntake,
        store: PostgresRecordStore,
    },
}

impl AppServices {
    pub fn in_memory(store: InMemoryRecordStore) -> Self {
        let shared: Arc<dyn RecordStore> = Arc::new(store.clone());
        AppServices::InMemory {
            intake: InvoiceIntake::new(shared),
            store,
        }
    }

    pub fn postgres(store: PostgresRecordStore) -> Self {
        let shared: Arc<dyn RecordStore> = Arc::new(store.clone());
        AppServices::Postgres {
            intake: InvoiceIntake::new(shared),
            store,
        }
    }

    pub fn intake(&self) -> &SharedIntake {
        match self {
            AppServices::InMemory { intake, .. } | AppServices::Postgres { intake, .. } => intake,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            AppServices::InMemory { .. } => "in_memory",
            AppServices::Postgres { .. } => "postgres",
        }
    }

    /// The in-memory store, when that backend is active.
    pub fn in_memory_store(&self) -> Option<&InMemoryRecordStore> {
        match self {
            AppServices::InMemory { store, .. } => Some(store),
            AppServices::Postgres { .. } => None,
        }
    }
}

/// Pick the backend from configuration.
///
/// With `DATABASE_URL` set the Postgres schema is applied before serving;
/// otherwise an in-memory store seeded with the default currencies is used.
pub async fn build_services(config: &AppConfig) -> StoreResult<AppServices> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresRecordStore::connect(url, config.db_max_connections).await?;
            store.migrate().await?;
            Ok(AppServices::postgres(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory record store");
            Ok(AppServices::in_memory(InMemoryRecordStore::with_default_currencies()))
        }
    }
}
