mod dashboard;
mod health;
mod kehadiran;
mod links;
mod multipart;
mod previews;
mod resources;
mod selectors;
mod shared;
mod state;
mod stok;
mod toasts;

pub use state::AdminState;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    application::resources::{
        BarangResource, DokumentasiResource, PelangganResource, PeminjamanResource,
        PenggunaResource, RencanaResource, TransaksiResource,
    },
    infra::assets,
};

use super::middleware::{log_responses, set_request_context};

pub fn build_admin_router(state: AdminState) -> Router {
    let upload_limit = usize::try_from(state.upload_limit_bytes).unwrap_or(usize::MAX);
    Router::new()
        .route("/", get(dashboard::admin_dashboard))
        .merge(resources::routes::<BarangResource>(upload_limit))
        .merge(resources::routes::<PeminjamanResource>(upload_limit))
        .merge(resources::routes::<PelangganResource>(upload_limit))
        .merge(resources::routes::<TransaksiResource>(upload_limit))
        .merge(resources::routes::<RencanaResource>(upload_limit))
        .merge(resources::routes::<DokumentasiResource>(upload_limit))
        .merge(resources::routes::<PenggunaResource>(upload_limit))
        .route("/stok", get(stok::admin_stok))
        .route("/stok/panel", post(stok::admin_stok_panel))
        .route(
            "/stok/{barang_id}/transactions",
            get(stok::admin_stok_transactions),
        )
        .route(
            "/stok/add",
            get(stok::admin_stok_add_modal).post(stok::admin_stok_add),
        )
        .route("/kehadiran/rekap/{scope}", get(kehadiran::admin_rekap))
        .route(
            "/kehadiran/rekap/{scope}/panel",
            post(kehadiran::admin_rekap_panel),
        )
        .route("/previews/{id}", get(previews::admin_preview))
        .route("/modal/close", post(dashboard::admin_modal_close))
        .route("/toasts", post(toasts::admin_toast))
        .route("/storage/{*path}", get(links::admin_storage))
        .route("/export/{*format}", get(links::admin_export))
        .route("/_health", get(health::admin_health))
        .route("/static/admin/{*path}", get(assets::serve_admin))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}
