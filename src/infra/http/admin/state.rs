use std::sync::Arc;

use crate::application::{
    admin::{
        AdminChromeService, AdminDashboardService, AdminKehadiranService, AdminResourceService,
        AdminStokService, AdminUiSettings,
    },
    backend::BackendGateway,
    uploads::PreviewRegistry,
};

#[derive(Clone)]
pub struct AdminState {
    pub chrome: Arc<AdminChromeService>,
    pub dashboard: Arc<AdminDashboardService>,
    pub resources: Arc<AdminResourceService>,
    pub stok: Arc<AdminStokService>,
    pub kehadiran: Arc<AdminKehadiranService>,
    pub previews: Arc<PreviewRegistry>,
    pub backend: Arc<dyn BackendGateway>,
    pub upload_limit_bytes: u64,
}

impl AdminState {
    pub fn new(
        backend: Arc<dyn BackendGateway>,
        chrome: AdminChromeService,
        ui: AdminUiSettings,
        previews: Arc<PreviewRegistry>,
        upload_limit_bytes: u64,
    ) -> Self {
        Self {
            chrome: Arc::new(chrome),
            dashboard: Arc::new(AdminDashboardService::new(backend.clone())),
            resources: Arc::new(AdminResourceService::new(backend.clone(), ui)),
            stok: Arc::new(AdminStokService::new(backend.clone(), ui)),
            kehadiran: Arc::new(AdminKehadiranService::new(backend.clone(), ui)),
            previews,
            backend,
            upload_limit_bytes,
        }
    }
}
