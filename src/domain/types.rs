//! Status enumerations echoed by the backend.

use serde::{Deserialize, Serialize};

/// Key/label pair used by filter tabs and status selectors.
pub trait StatusKey: Copy + 'static {
    fn key(self) -> &'static str;
    fn label(self) -> &'static str;
    fn selectable() -> &'static [Self];

    fn from_key(raw: &str) -> Option<Self> {
        Self::selectable()
            .iter()
            .copied()
            .find(|status| status.key() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KondisiBarang {
    #[default]
    Baik,
    RusakRingan,
    RusakBerat,
    #[serde(other)]
    Lainnya,
}

impl StatusKey for KondisiBarang {
    fn key(self) -> &'static str {
        match self {
            KondisiBarang::Baik => "baik",
            KondisiBarang::RusakRingan => "rusak_ringan",
            KondisiBarang::RusakBerat => "rusak_berat",
            KondisiBarang::Lainnya => "lainnya",
        }
    }

    fn label(self) -> &'static str {
        match self {
            KondisiBarang::Baik => "Baik",
            KondisiBarang::RusakRingan => "Rusak Ringan",
            KondisiBarang::RusakBerat => "Rusak Berat",
            KondisiBarang::Lainnya => "Lainnya",
        }
    }

    fn selectable() -> &'static [Self] {
        &[
            KondisiBarang::Baik,
            KondisiBarang::RusakRingan,
            KondisiBarang::RusakBerat,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeminjamanStatus {
    #[default]
    Menunggu,
    Disetujui,
    Dipinjam,
    Dikembalikan,
    Ditolak,
    #[serde(other)]
    Lainnya,
}

impl StatusKey for PeminjamanStatus {
    fn key(self) -> &'static str {
        match self {
            PeminjamanStatus::Menunggu => "menunggu",
            PeminjamanStatus::Disetujui => "disetujui",
            PeminjamanStatus::Dipinjam => "dipinjam",
            PeminjamanStatus::Dikembalikan => "dikembalikan",
            PeminjamanStatus::Ditolak => "ditolak",
            PeminjamanStatus::Lainnya => "lainnya",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PeminjamanStatus::Menunggu => "Menunggu",
            PeminjamanStatus::Disetujui => "Disetujui",
            PeminjamanStatus::Dipinjam => "Dipinjam",
            PeminjamanStatus::Dikembalikan => "Dikembalikan",
            PeminjamanStatus::Ditolak => "Ditolak",
            PeminjamanStatus::Lainnya => "Lainnya",
        }
    }

    fn selectable() -> &'static [Self] {
        &[
            PeminjamanStatus::Menunggu,
            PeminjamanStatus::Disetujui,
            PeminjamanStatus::Dipinjam,
            PeminjamanStatus::Dikembalikan,
            PeminjamanStatus::Ditolak,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransaksiStatus {
    #[default]
    Pending,
    Diproses,
    Selesai,
    Dibatalkan,
    #[serde(other)]
    Lainnya,
}

impl StatusKey for TransaksiStatus {
    fn key(self) -> &'static str {
        match self {
            TransaksiStatus::Pending => "pending",
            TransaksiStatus::Diproses => "diproses",
            TransaksiStatus::Selesai => "selesai",
            TransaksiStatus::Dibatalkan => "dibatalkan",
            TransaksiStatus::Lainnya => "lainnya",
        }
    }

    fn label(self) -> &'static str {
        match self {
            TransaksiStatus::Pending => "Pending",
            TransaksiStatus::Diproses => "Diproses",
            TransaksiStatus::Selesai => "Selesai",
            TransaksiStatus::Dibatalkan => "Dibatalkan",
            TransaksiStatus::Lainnya => "Lainnya",
        }
    }

    fn selectable() -> &'static [Self] {
        &[
            TransaksiStatus::Pending,
            TransaksiStatus::Diproses,
            TransaksiStatus::Selesai,
            TransaksiStatus::Dibatalkan,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RencanaStatus {
    #[default]
    Direncanakan,
    Berjalan,
    Selesai,
    Dibatalkan,
    #[serde(other)]
    Lainnya,
}

impl StatusKey for RencanaStatus {
    fn key(self) -> &'static str {
        match self {
            RencanaStatus::Direncanakan => "direncanakan",
            RencanaStatus::Berjalan => "berjalan",
            RencanaStatus::Selesai => "selesai",
            RencanaStatus::Dibatalkan => "dibatalkan",
            RencanaStatus::Lainnya => "lainnya",
        }
    }

    fn label(self) -> &'static str {
        match self {
            RencanaStatus::Direncanakan => "Direncanakan",
            RencanaStatus::Berjalan => "Berjalan",
            RencanaStatus::Selesai => "Selesai",
            RencanaStatus::Dibatalkan => "Dibatalkan",
            RencanaStatus::Lainnya => "Lainnya",
        }
    }

    fn selectable() -> &'static [Self] {
        &[
            RencanaStatus::Direncanakan,
            RencanaStatus::Berjalan,
            RencanaStatus::Selesai,
            RencanaStatus::Dibatalkan,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StokJenis {
    #[default]
    Masuk,
    Keluar,
    #[serde(other)]
    Lainnya,
}

impl StatusKey for StokJenis {
    fn key(self) -> &'static str {
        match self {
            StokJenis::Masuk => "masuk",
            StokJenis::Keluar => "keluar",
            StokJenis::Lainnya => "lainnya",
        }
    }

    fn label(self) -> &'static str {
        match self {
            StokJenis::Masuk => "Masuk",
            StokJenis::Keluar => "Keluar",
            StokJenis::Lainnya => "Lainnya",
        }
    }

    fn selectable() -> &'static [Self] {
        &[StokJenis::Masuk, StokJenis::Keluar]
    }
}
