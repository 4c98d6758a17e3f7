use std::sync::Arc;

use futures::future::join_all;
use tracing::warn;

use crate::application::{
    backend::{BackendError, BackendGateway},
    resources::{
        BarangResource, DokumentasiResource, PelangganResource, PeminjamanResource,
        PenggunaResource, RencanaResource, Resource, TransaksiResource,
    },
};
use crate::presentation::admin::views::{AdminDashboardCardView, AdminDashboardView};

use super::resources::export_links;

/// One overview card: where the count comes from and how it is labelled.
#[derive(Debug, Clone, Copy)]
struct CardSource {
    label: &'static str,
    path: &'static str,
    collection_key: &'static str,
    hint: &'static str,
}

impl CardSource {
    fn of<R: Resource>(hint: &'static str) -> Self {
        Self {
            label: R::TITLE,
            path: R::index_path(),
            collection_key: R::COLLECTION_KEY,
            hint,
        }
    }
}

fn card_sources() -> Vec<CardSource> {
    vec![
        CardSource::of::<BarangResource>("Barang inventaris terdaftar"),
        CardSource::of::<PeminjamanResource>("Pengajuan peminjaman"),
        CardSource::of::<PelangganResource>("Pelanggan tercatat"),
        CardSource::of::<TransaksiResource>("Transaksi penjualan"),
        CardSource::of::<RencanaResource>("Rencana kegiatan"),
        CardSource::of::<DokumentasiResource>("Berkas dokumentasi"),
        CardSource::of::<PenggunaResource>("Akun pengguna"),
    ]
}

#[derive(Clone)]
pub struct AdminDashboardService {
    backend: Arc<dyn BackendGateway>,
}

impl AdminDashboardService {
    pub fn new(backend: Arc<dyn BackendGateway>) -> Self {
        Self { backend }
    }

    /// Totals of every resource, fetched concurrently as a one-row page. A
    /// failing resource leaves its card without a number.
    pub async fn overview(&self) -> AdminDashboardView {
        let sources = card_sources();
        let totals = join_all(sources.iter().map(|source| self.total(*source))).await;

        let cards = sources
            .into_iter()
            .zip(totals)
            .map(|(source, total)| AdminDashboardCardView {
                label: source.label.to_string(),
                href: source.path.to_string(),
                total,
                hint: source.hint.to_string(),
            })
            .collect();

        AdminDashboardView {
            title: "Dashboard".to_string(),
            cards,
            export_links: export_links(),
        }
    }

    async fn total(&self, source: CardSource) -> Option<u64> {
        let params = [("perPage".to_string(), "1".to_string())];
        let result = async {
            let props = self.backend.fetch_props(source.path, &params).await?;
            let page = props.collection::<serde_json::Value>(source.collection_key)?;
            Ok::<u64, BackendError>(page.total)
        }
        .await;

        match result {
            Ok(total) => Some(total),
            Err(err) => {
                warn!(
                    target = "sekretariat::application::admin::dashboard",
                    path = source.path,
                    error = %err,
                    "dashboard total unavailable"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        backend::{FormMethod, PageProps, SubmitOutcome},
        uploads::MultipartBody,
    };
    use serde_json::json;

    struct CountingBackend;

    #[async_trait::async_trait]
    impl BackendGateway for CountingBackend {
        async fn fetch_props(
            &self,
            path: &str,
            params: &[(String, String)],
        ) -> Result<PageProps, BackendError> {
            assert!(params.iter().any(|(key, value)| key == "perPage" && value == "1"));
            match path {
                "/barang" => Ok(PageProps::new(json!({
                    "barang": {"data": [{}], "current_page": 1, "last_page": 42, "per_page": 1, "total": 42}
                }))),
                "/pengguna" => Err(BackendError::status(500, "boom")),
                _ => Ok(PageProps::new(json!({}))),
            }
        }

        async fn fetch_json(
            &self,
            _path: &str,
            _params: &[(String, String)],
        ) -> Result<serde_json::Value, BackendError> {
            Ok(serde_json::Value::Null)
        }

        async fn submit(
            &self,
            _method: FormMethod,
            _path: &str,
            _body: MultipartBody,
        ) -> Result<SubmitOutcome, BackendError> {
            Ok(SubmitOutcome::accepted())
        }

        async fn submit_json(
            &self,
            _method: FormMethod,
            _path: &str,
            _body: serde_json::Value,
        ) -> Result<SubmitOutcome, BackendError> {
            Ok(SubmitOutcome::accepted())
        }

        async fn delete(&self, _path: &str) -> Result<SubmitOutcome, BackendError> {
            Ok(SubmitOutcome::accepted())
        }

        fn public_url(&self, path: &str) -> String {
            path.to_string()
        }
    }

    #[tokio::test]
    async fn failing_totals_degrade_to_empty_cards() {
        let service = AdminDashboardService::new(Arc::new(CountingBackend));
        let view = service.overview().await;

        assert_eq!(view.cards.len(), 7);
        let barang = &view.cards[0];
        assert_eq!(barang.total, Some(42));
        assert_eq!(barang.href, "/barang");

        let pengguna = view
            .cards
            .iter()
            .find(|card| card.href == "/pengguna")
            .expect("pengguna card");
        assert_eq!(pengguna.total, None);
        assert_eq!(pengguna.total_label(), "-");

        // Missing collections count as failures too.
        assert_eq!(view.cards.iter().filter(|card| card.total.is_none()).count(), 6);
        assert_eq!(view.export_links.len(), 4);
    }
}
