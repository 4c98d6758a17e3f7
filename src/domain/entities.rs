//! Backend records as echoed into page props.
//!
//! Every record is read-only here; the backend owns lifecycle and validation.

use serde::{Deserialize, Serialize};

use crate::domain::{
    de,
    types::{KondisiBarang, PeminjamanStatus, RencanaStatus, StokJenis, TransaksiStatus},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spesifikasi {
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub id: Option<u64>,
    #[serde(default)]
    pub nama: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub nilai: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub jumlah: Option<u64>,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub jumlah_tersedia: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barang {
    pub id: u64,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub kode: Option<String>,
    pub nama: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub kategori: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub jumlah: u64,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub jumlah_tersedia: Option<u64>,
    #[serde(default)]
    pub kondisi: KondisiBarang,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub lokasi: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub deskripsi: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub foto: Option<String>,
    #[serde(default)]
    pub spesifikasi: Vec<Spesifikasi>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Barang {
    /// Units that can still be lent out; falls back to the total when the
    /// backend does not report availability.
    pub fn available(&self) -> u64 {
        self.jumlah_tersedia.unwrap_or(self.jumlah)
    }
}

/// Compact reference embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: u64,
    #[serde(default, alias = "name", alias = "judul")]
    pub nama: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pelanggan {
    pub id: u64,
    pub nama: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub telepon: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub alamat: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub sesi_penjualan_id: Option<u64>,
    #[serde(default)]
    pub sesi_penjualan: Option<RecordRef>,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub transaksi_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeminjamanItem {
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub id: Option<u64>,
    #[serde(deserialize_with = "de::lenient_u64")]
    pub barang_id: u64,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub spesifikasi_id: Option<u64>,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub jumlah: u64,
    #[serde(default)]
    pub barang: Option<RecordRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peminjaman {
    pub id: u64,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub kode: Option<String>,
    pub nama_peminjam: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub kontak: Option<String>,
    #[serde(default)]
    pub tanggal_pinjam: Option<String>,
    #[serde(default)]
    pub tanggal_kembali: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub keperluan: Option<String>,
    #[serde(default)]
    pub status: PeminjamanStatus,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub catatan: Option<String>,
    #[serde(default)]
    pub items: Vec<PeminjamanItem>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Peminjaman {
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| item.jumlah).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransaksiItem {
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub menu_id: Option<u64>,
    #[serde(default)]
    pub nama_menu: String,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub jumlah: u64,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub harga: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaksi {
    pub id: u64,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub kode: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub pelanggan_id: Option<u64>,
    #[serde(default)]
    pub pelanggan: Option<RecordRef>,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub sesi_penjualan_id: Option<u64>,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub total: f64,
    #[serde(default)]
    pub status: TransaksiStatus,
    #[serde(default)]
    pub tanggal: Option<String>,
    #[serde(default)]
    pub items: Vec<TransaksiItem>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rencana {
    pub id: u64,
    pub judul: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub deskripsi: Option<String>,
    #[serde(default)]
    pub tanggal_mulai: Option<String>,
    #[serde(default)]
    pub tanggal_selesai: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_f64")]
    pub anggaran: Option<f64>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub penanggung_jawab: Option<String>,
    #[serde(default)]
    pub status: RencanaStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dokumentasi {
    pub id: u64,
    pub judul: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub deskripsi: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub kategori: Option<String>,
    #[serde(default)]
    pub tanggal: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Dokumentasi {
    pub fn is_image(&self) -> bool {
        match (self.file_type.as_deref(), self.file_path.as_deref()) {
            (Some(kind), _) if kind.starts_with("image/") => true,
            (_, Some(path)) => mime_guess::from_path(path)
                .first()
                .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pengguna {
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub role_id: Option<u64>,
    #[serde(default)]
    pub role: Option<RecordRef>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One stock row: an item, optionally narrowed to one specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StokRow {
    #[serde(deserialize_with = "de::lenient_u64")]
    pub barang_id: u64,
    #[serde(default)]
    pub barang_nama: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub kode: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub spesifikasi_id: Option<u64>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub spesifikasi_nama: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub stok: u64,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub satuan: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StokTransaksi {
    pub id: u64,
    #[serde(default)]
    pub jenis: StokJenis,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub jumlah: u64,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub keterangan: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub user: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Attendance tally for one student over the selected period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RekapKehadiran {
    #[serde(deserialize_with = "de::lenient_u64")]
    pub siswa_id: u64,
    pub nama: String,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub kelas: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub sangga: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub hadir: u64,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub izin: u64,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub sakit: u64,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub alpha: u64,
}

impl RekapKehadiran {
    pub fn total(&self) -> u64 {
        self.hadir + self.izin + self.sakit + self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barang_decodes_laravel_payload() {
        let raw = r#"{
            "id": 4,
            "kode": "BRG-004",
            "nama": "Kursi Lipat",
            "jumlah": "20",
            "jumlah_tersedia": 12,
            "kondisi": "rusak_ringan",
            "foto": "barang/kursi.jpg",
            "spesifikasi": [{"id": 1, "nama": "Warna", "nilai": "Hitam", "jumlah_tersedia": "5"}],
            "created_at": "2024-03-01T08:00:00.000000Z"
        }"#;
        let barang: Barang = serde_json::from_str(raw).expect("barang decodes");
        assert_eq!(barang.jumlah, 20);
        assert_eq!(barang.available(), 12);
        assert_eq!(barang.kondisi, KondisiBarang::RusakRingan);
        assert_eq!(barang.spesifikasi[0].jumlah_tersedia, Some(5));
    }

    #[test]
    fn dokumentasi_detects_images_from_path() {
        let doc = Dokumentasi {
            id: 1,
            judul: "Apel pagi".into(),
            deskripsi: None,
            kategori: None,
            tanggal: None,
            file_path: Some("dokumentasi/apel.png".into()),
            file_type: None,
            created_at: None,
        };
        assert!(doc.is_image());

        let pdf = Dokumentasi {
            file_path: Some("dokumentasi/laporan.pdf".into()),
            ..doc
        };
        assert!(!pdf.is_image());
    }

    #[test]
    fn peminjaman_sums_item_units() {
        let raw = r#"{"id":9,"nama_peminjam":"Sari","status":"dipinjam",
            "items":[{"barang_id":1,"jumlah":2},{"barang_id":"3","jumlah":"4"}]}"#;
        let loan: Peminjaman = serde_json::from_str(raw).expect("loan decodes");
        assert_eq!(loan.total_units(), 6);
        assert_eq!(loan.status, PeminjamanStatus::Dipinjam);
    }
}
