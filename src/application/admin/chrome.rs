use crate::presentation::admin::views::{
    AdminBrandView, AdminChrome, AdminMetaView, AdminNavigationItemView, AdminNavigationView,
};

const NAV_ITEMS: &[(&str, &str)] = &[
    ("/", "Dashboard"),
    ("/barang", "Barang"),
    ("/peminjaman", "Peminjaman"),
    ("/stok", "Stok"),
    ("/pelanggan", "Pelanggan"),
    ("/transaksi", "Transaksi"),
    ("/rencana", "Rencana"),
    ("/dokumentasi", "Dokumentasi"),
    ("/kehadiran/rekap/sangga", "Rekap Kehadiran"),
    ("/pengguna", "Pengguna"),
];

#[derive(Clone)]
pub struct AdminChromeService {
    brand_title: String,
    datastar_src: String,
}

impl AdminChromeService {
    pub fn new(brand_title: impl Into<String>, datastar_src: impl Into<String>) -> Self {
        Self {
            brand_title: brand_title.into(),
            datastar_src: datastar_src.into(),
        }
    }

    pub fn load(&self, active_path: &str) -> AdminChrome {
        let brand = AdminBrandView {
            title: self.brand_title.clone(),
        };

        let items: Vec<AdminNavigationItemView> = NAV_ITEMS
            .iter()
            .map(|(href, label)| AdminNavigationItemView {
                label: (*label).to_string(),
                href: (*href).to_string(),
                is_active: is_active(href, active_path),
            })
            .collect();

        let navigation = AdminNavigationView { items };

        let active_label = navigation
            .items
            .iter()
            .find(|item| item.is_active)
            .map(|item| item.label.as_str())
            .unwrap_or("Dashboard");

        let meta = AdminMetaView {
            title: format!("{} · {}", brand.title, active_label),
        };

        AdminChrome {
            brand,
            navigation,
            meta,
            datastar_src: self.datastar_src.clone(),
        }
    }
}

fn is_active(href: &str, active_path: &str) -> bool {
    if href == "/" {
        return active_path == "/";
    }
    if active_path == href {
        return true;
    }
    // Both attendance scopes live under one menu entry.
    let section = href.rsplit_once('/').map(|(head, _)| head).unwrap_or(href);
    let section = if section.is_empty() { href } else { section };
    active_path
        .strip_prefix(section)
        .is_some_and(|rest| rest.starts_with('/'))
}
