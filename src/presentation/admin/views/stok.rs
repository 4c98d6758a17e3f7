use askama::Template;

use super::{FieldView, OptionView};

#[derive(Clone, Debug)]
pub struct StokRowView {
    pub spesifikasi: String,
    pub stok: u64,
    pub satuan: String,
    pub updated: String,
    pub transactions_action: String,
    pub add_action: String,
}

#[derive(Clone, Debug)]
pub struct StokGroupView {
    pub barang_nama: String,
    pub kode: String,
    pub total: u64,
    pub rows: Vec<StokRowView>,
}

#[derive(Clone, Debug)]
pub struct StokBoardView {
    pub panel_action: String,
    pub search_value: String,
    pub debounce_ms: u64,
    pub sort_options: Vec<OptionView>,
    pub groups: Vec<StokGroupView>,
    pub empty_message: String,
    pub summary: String,
}

impl StokBoardView {
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/stok_panel.html")]
pub struct StokPanelTemplate {
    pub content: StokBoardView,
}

#[derive(Clone, Debug)]
pub struct StokTransaksiRowView {
    pub jenis: String,
    pub tone: &'static str,
    pub jumlah: u64,
    pub keterangan: String,
    pub user: String,
    pub waktu: String,
}

#[derive(Clone, Debug)]
pub struct StokTransactionsModalView {
    pub heading: String,
    pub rows: Vec<StokTransaksiRowView>,
}

impl StokTransactionsModalView {
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/stok_transactions_modal.html")]
pub struct StokTransactionsModalTemplate {
    pub content: StokTransactionsModalView,
}

#[derive(Clone, Debug)]
pub struct StokAddModalView {
    pub heading: String,
    pub action: String,
    pub barang_id: String,
    pub spesifikasi_id: String,
    pub fields: Vec<FieldView>,
    pub summary_error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/stok_add_modal.html")]
pub struct StokAddModalTemplate {
    pub content: StokAddModalView,
}
