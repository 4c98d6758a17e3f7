//! Shared CSS selectors used by admin Datastar responses.

use crate::application::sequence::Ticket;

pub const PANEL: &str = "[data-role=\"panel\"]";
pub const TOAST_STACK: &str = "[data-admin-toast=\"stack\"]";
pub const MODAL_HOST: &str = "[data-admin-modal=\"host\"]";

pub const STOK_PANEL: &str = "[data-admin-panel=\"stok\"]";
pub const KEHADIRAN_PANEL: &str = "[data-admin-panel=\"kehadiran\"]";

/// Table panel of one resource list.
pub fn resource_panel(slug: &str) -> String {
    format!("[data-admin-panel=\"{slug}\"]")
}

/// Preview slot of one file input.
pub fn file_preview(field: &str) -> String {
    format!("[data-file-preview=\"{field}\"]")
}

/// Narrow a panel selector to the panel still waiting on `ticket`. The
/// browser re-tickets the panel on every request it sends, so an answer to
/// an older request no longer matches anything.
pub fn ticketed(selector: &str, ticket: Option<Ticket>) -> String {
    match ticket {
        Some(ticket) => format!("{selector}[data-panel-ticket=\"{}\"]", ticket.value()),
        None => selector.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_matching_ticket_is_targeted() {
        let newer = ticketed(STOK_PANEL, Ticket::parse("5"));
        let older = ticketed(STOK_PANEL, Ticket::parse("4"));
        assert_eq!(
            newer,
            "[data-admin-panel=\"stok\"][data-panel-ticket=\"5\"]"
        );
        assert_ne!(newer, older);
        assert_eq!(ticketed(STOK_PANEL, None), STOK_PANEL);
    }
}
