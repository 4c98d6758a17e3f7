//! `sekretariat browse`: page through one resource list from a terminal.
//!
//! Drives the same [`ListController`] state machine the list panels follow,
//! so search debouncing, sort toggling and the URL it would show behave the
//! same way as in the browser.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::{
    application::{
        backend::{BackendError, BackendGateway},
        error::AppError,
        resources::{
            BarangResource, DokumentasiResource, PelangganResource, PeminjamanResource,
            Column, PenggunaResource, RencanaResource, Resource, RowContext, TransaksiResource,
        },
        ui::{
            controller::{BackendNavigator, ListController, NavigationOutcome},
            dropdown::{Dropdown, PointerHub, PointerTarget},
        },
    },
    config::{BrowseArgs, Settings},
    infra::{backend::HttpBackend, error::InfraError},
};

const TARGET: &str = "sekretariat::console";

const HELP: &str = "\
perintah:
  /teks        cari (kosongkan dengan `/`)
  n | p        halaman berikut / sebelumnya
  g N          ke halaman N
  o            buka / tutup menu urutan
  o KOLOM|N    urutkan (ulangi untuk membalik arah)
  f NILAI|-    saring status
  x KUNCI NILAI|-  saring tambahan
  pp N         baris per halaman
  r            muat ulang
  q            keluar";

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleCommand {
    Search(String),
    Next,
    Previous,
    Page(u32),
    SortMenu,
    Sort(String),
    Filter(Option<String>),
    Extra(String, Option<String>),
    PerPage(u32),
    Refresh,
    Help,
    Quit,
}

fn optional(value: &str) -> Option<String> {
    match value.trim() {
        "" | "-" => None,
        value => Some(value.to_string()),
    }
}

fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return Ok(ConsoleCommand::Search(text.trim().to_string()));
    }
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let number = |raw: &str| {
        raw.parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| format!("`{raw}` bukan angka positif"))
    };
    match head {
        "n" => Ok(ConsoleCommand::Next),
        "p" => Ok(ConsoleCommand::Previous),
        "g" => number(rest).map(ConsoleCommand::Page),
        "o" if rest.is_empty() => Ok(ConsoleCommand::SortMenu),
        "o" => Ok(ConsoleCommand::Sort(rest.to_string())),
        "f" => Ok(ConsoleCommand::Filter(optional(rest))),
        "x" => {
            let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
            if key.is_empty() {
                return Err("gunakan `x KUNCI NILAI`".to_string());
            }
            Ok(ConsoleCommand::Extra(key.to_string(), optional(value)))
        }
        "pp" => number(rest).map(ConsoleCommand::PerPage),
        "r" => Ok(ConsoleCommand::Refresh),
        "?" | "h" | "" => Ok(ConsoleCommand::Help),
        "q" => Ok(ConsoleCommand::Quit),
        other => Err(format!("perintah `{other}` tidak dikenal")),
    }
}

const SORT_MENU: &str = "sort-menu";

/// Sort menu of the prompt. Any command other than `o` lands outside the
/// menu and closes it.
struct SortMenu {
    hub: Arc<PointerHub>,
    menu: Dropdown,
    options: Vec<&'static Column>,
}

impl SortMenu {
    fn new(columns: &'static [Column]) -> Self {
        let hub = PointerHub::new();
        let menu = Dropdown::mount(SORT_MENU, &hub);
        Self {
            hub,
            menu,
            options: columns.iter().filter(|column| column.sortable).collect(),
        }
    }

    fn toggle(&mut self) -> bool {
        self.menu.toggle();
        self.menu.is_open()
    }

    /// Resolve `choice` to a sort key. While the menu is open a number picks
    /// the listed option.
    fn choose(&mut self, choice: &str) -> String {
        let picked = match choice.parse::<usize>() {
            Ok(index) if self.menu.is_open() => index
                .checked_sub(1)
                .and_then(|index| self.options.get(index))
                .map(|column| column.key),
            _ => None,
        };
        self.menu.select(picked.unwrap_or(choice))
    }

    fn dismiss(&self) {
        self.hub.pointer_down(&PointerTarget::outside());
    }

    fn is_open(&self) -> bool {
        self.menu.is_open()
    }

    fn print(&self, active: &str) {
        for (index, column) in self.options.iter().enumerate() {
            let marker = if column.key == active { "*" } else { " " };
            println!("{marker}{}. {} ({})", index + 1, column.label, column.key);
        }
    }
}

/// Entry point of the `browse` subcommand.
pub async fn run(settings: &Settings, args: BrowseArgs) -> Result<(), AppError> {
    let backend: Arc<dyn BackendGateway> = Arc::new(HttpBackend::new(&settings.backend)?);
    let slug = args.resource.trim().to_lowercase();
    let search = args.search.as_deref();

    if slug == BarangResource::SLUG {
        browse::<BarangResource>(settings, backend, search).await
    } else if slug == PeminjamanResource::SLUG {
        browse::<PeminjamanResource>(settings, backend, search).await
    } else if slug == PelangganResource::SLUG {
        browse::<PelangganResource>(settings, backend, search).await
    } else if slug == TransaksiResource::SLUG {
        browse::<TransaksiResource>(settings, backend, search).await
    } else if slug == RencanaResource::SLUG {
        browse::<RencanaResource>(settings, backend, search).await
    } else if slug == DokumentasiResource::SLUG {
        browse::<DokumentasiResource>(settings, backend, search).await
    } else if slug == PenggunaResource::SLUG {
        browse::<PenggunaResource>(settings, backend, search).await
    } else {
        Err(AppError::validation(format!("unknown resource `{slug}`")))
    }
}

async fn browse<R: Resource>(
    settings: &Settings,
    backend: Arc<dyn BackendGateway>,
    search: Option<&str>,
) -> Result<(), AppError> {
    let schema = R::schema();
    let raw_query = search
        .map(|text| {
            form_urlencoded::Serializer::new(String::new())
                .append_pair(schema.param_names().search, text)
                .finish()
        })
        .unwrap_or_default();
    let opening = schema.decode_query_string(&raw_query);
    let props = backend
        .fetch_props(schema.path(), &schema.encode(&opening))
        .await?;

    let mut controller = ListController::new(
        Arc::new(schema.clone()),
        BackendNavigator::new(backend),
        settings.ui.search_debounce,
    );
    controller.mount(props, Some(&raw_query)).await?;
    let ctx = RowContext {
        timezone: settings.ui.timezone,
    };
    print_page::<R>(&controller, &ctx);
    println!("ketik `?` untuk bantuan");
    let mut sort_menu = SortMenu::new(R::columns());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(InfraError::from)? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        debug!(target = TARGET, resource = R::SLUG, ?command, "console command");
        if !matches!(command, ConsoleCommand::SortMenu | ConsoleCommand::Sort(_)) {
            sort_menu.dismiss();
        }

        let outcome = match command {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ConsoleCommand::Search(text) => {
                controller.type_search(text);
                controller
                    .next_settled_search()
                    .await
                    .map(|outcome| outcome.unwrap_or(NavigationOutcome::Unchanged))
            }
            ConsoleCommand::Next => {
                let page = controller.query().page.saturating_add(1);
                controller.go_to_page(page).await
            }
            ConsoleCommand::Previous => {
                let page = controller.query().page.saturating_sub(1).max(1);
                controller.go_to_page(page).await
            }
            ConsoleCommand::Page(page) => controller.go_to_page(page).await,
            ConsoleCommand::SortMenu => {
                if sort_menu.toggle() {
                    sort_menu.print(&controller.query().sort_field);
                }
                continue;
            }
            ConsoleCommand::Sort(choice) => {
                let field = sort_menu.choose(&choice);
                controller.sort_by(&field).await
            }
            ConsoleCommand::Filter(filter) => controller.set_filter(filter).await,
            ConsoleCommand::Extra(key, value) => controller.set_extra(&key, value).await,
            ConsoleCommand::PerPage(per_page) => controller.set_per_page(per_page).await,
            ConsoleCommand::Refresh => controller.refresh().await,
        };

        match outcome {
            Ok(NavigationOutcome::Applied { .. }) => print_page::<R>(&controller, &ctx),
            Ok(NavigationOutcome::Unchanged) => println!("(tidak ada perubahan)"),
            Ok(NavigationOutcome::Stale) => {}
            Err(err) => report_failure(&err),
        }
    }

    Ok(())
}

fn report_failure(err: &BackendError) {
    warn!(target = TARGET, error = %err, "console navigation failed");
    eprintln!("gagal memuat data: {err}");
}

fn print_page<R: Resource>(controller: &ListController<BackendNavigator>, ctx: &RowContext) {
    println!();
    println!("{} · {}", R::TITLE, controller.location());
    let page = match controller
        .props()
        .collection::<R::Record>(R::COLLECTION_KEY)
    {
        Ok(page) => page,
        Err(err) => {
            report_failure(&err);
            return;
        }
    };

    let header: Vec<&str> = R::columns().iter().map(|column| column.label).collect();
    println!("{}", header.join(" | "));
    if page.data.is_empty() {
        println!("(kosong)");
    }
    for record in &page.data {
        let cells: Vec<String> = R::row(record, ctx)
            .into_iter()
            .map(|cell| cell.text)
            .collect();
        println!("{}", cells.join(" | "));
    }
    match page.slice_bounds() {
        Some((from, to)) => println!(
            "{from}-{to} dari {} · halaman {}/{}",
            page.total, page.current_page, page.last_page
        ),
        None => println!("halaman {}/{}", page.current_page, page.last_page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_prefix_searches() {
        assert_eq!(
            parse_command("/ kursi lipat "),
            Ok(ConsoleCommand::Search("kursi lipat".to_string()))
        );
        assert_eq!(parse_command("/"), Ok(ConsoleCommand::Search(String::new())));
    }

    #[test]
    fn dash_clears_filters() {
        assert_eq!(parse_command("f -"), Ok(ConsoleCommand::Filter(None)));
        assert_eq!(
            parse_command("f dipinjam"),
            Ok(ConsoleCommand::Filter(Some("dipinjam".to_string())))
        );
        assert_eq!(
            parse_command("x bulan 3"),
            Ok(ConsoleCommand::Extra("bulan".to_string(), Some("3".to_string())))
        );
        assert_eq!(
            parse_command("x tahun"),
            Ok(ConsoleCommand::Extra("tahun".to_string(), None))
        );
    }

    #[test]
    fn pages_must_be_positive() {
        assert_eq!(parse_command("g 3"), Ok(ConsoleCommand::Page(3)));
        assert!(parse_command("g 0").is_err());
        assert!(parse_command("pp banyak").is_err());
        assert!(parse_command("zz").is_err());
    }

    #[test]
    fn bare_o_opens_the_sort_menu() {
        assert_eq!(parse_command("o"), Ok(ConsoleCommand::SortMenu));
        assert_eq!(
            parse_command("o nama"),
            Ok(ConsoleCommand::Sort("nama".to_string()))
        );
    }

    static COLUMNS: [Column; 3] = [
        Column::sortable("kode", "Kode"),
        Column::plain("foto", "Foto"),
        Column::sortable("nama", "Nama"),
    ];

    #[test]
    fn numbered_choices_need_an_open_menu() {
        let mut menu = SortMenu::new(&COLUMNS);
        assert_eq!(menu.choose("2"), "2");

        assert!(menu.toggle());
        assert_eq!(menu.choose("2"), "nama");
        assert!(!menu.is_open());

        menu.toggle();
        assert_eq!(menu.choose("9"), "9");
        assert_eq!(menu.choose("kode"), "kode");
    }

    #[test]
    fn other_commands_close_the_sort_menu() {
        let mut menu = SortMenu::new(&COLUMNS);
        assert!(menu.toggle());
        menu.dismiss();
        assert!(!menu.is_open());
        assert!(menu.toggle());
        assert!(!menu.toggle());
    }
}
