use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use shared_config::AppConfig;

use crate::services::backend::{AppointmentApi, AppointmentBackend};
use crate::services::page::{DoctorPage, PageSettings};

/// Holds one mounted [`DoctorPage`] per doctor id.
pub struct PageRegistry {
    settings: PageSettings,
    backend: Arc<dyn AppointmentBackend>,
    pages: RwLock<HashMap<String, Arc<DoctorPage>>>,
}

impl PageRegistry {
    pub fn new(config: AppConfig) -> Self {
        let backend = Arc::new(AppointmentApi::new(&config));
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: AppConfig, backend: Arc<dyn AppointmentBackend>) -> Self {
        Self {
            settings: PageSettings::from_config(&config),
            backend,
            pages: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the page for `doctor_id`, mounting a fresh one if needed.
    pub async fn page(&self, doctor_id: &str) -> Arc<DoctorPage> {
        if let Some(page) = self.pages.read().await.get(doctor_id) {
            return page.clone();
        }

        let mut pages = self.pages.write().await;
        pages
            .entry(doctor_id.to_string())
            .or_insert_with(|| {
                info!("Mounting doctor page for {}", doctor_id);
                Arc::new(DoctorPage::new(doctor_id, self.backend.clone(), self.settings))
            })
            .clone()
    }

    pub async fn get(&self, doctor_id: &str) -> Option<Arc<DoctorPage>> {
        self.pages.read().await.get(doctor_id).cloned()
    }

    /// Drops the page and everything it loaded.
    pub async fn unmount(&self, doctor_id: &str) -> bool {
        let removed = self.pages.write().await.remove(doctor_id).is_some();
        if removed {
            info!("Unmounted doctor page for {}", doctor_id);
        }
        removed
    }

    pub async fn mounted(&self) -> usize {
        self.pages.read().await.len()
    }
}
