//! Sort, filter and download menus that close on an outside pointer-down.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use dashmap::DashMap;

/// Element chain of a pointer-down event, from the target up to the
/// document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerTarget {
    path: Vec<String>,
}

impl PointerTarget {
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// A click on nothing in particular.
    pub fn outside() -> Self {
        Self::default()
    }

    pub fn is_within(&self, root: &str) -> bool {
        self.path.iter().any(|element| element == root)
    }
}

type Listener = Arc<dyn Fn(&PointerTarget) + Send + Sync>;

/// Global pointer-down listener registry.
#[derive(Default)]
pub struct PointerHub {
    next: AtomicU64,
    listeners: DashMap<u64, Listener>,
}

impl PointerHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register<F>(self: &Arc<Self>, listener: F) -> ListenerGuard
    where
        F: Fn(&PointerTarget) + Send + Sync + 'static,
    {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(id, Arc::new(listener));
        ListenerGuard {
            hub: Arc::clone(self),
            id,
        }
    }

    pub fn pointer_down(&self, target: &PointerTarget) {
        let listeners: Vec<Listener> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for listener in listeners {
            listener(target);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Keeps a listener registered; dropping it unregisters.
pub struct ListenerGuard {
    hub: Arc<PointerHub>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.hub.listeners.remove(&self.id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownState {
    Closed,
    Open,
}

/// One menu with its own boundary element and listener.
pub struct Dropdown {
    root: String,
    open: Arc<AtomicBool>,
    selected: Option<String>,
    _listener: ListenerGuard,
}

impl Dropdown {
    pub fn mount(root: impl Into<String>, hub: &Arc<PointerHub>) -> Self {
        let root = root.into();
        let open = Arc::new(AtomicBool::new(false));
        let listener = {
            let root = root.clone();
            let open = Arc::clone(&open);
            hub.register(move |target| {
                if !target.is_within(&root) {
                    open.store(false, Ordering::SeqCst);
                }
            })
        };
        Self {
            root,
            open,
            selected: None,
            _listener: listener,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn state(&self) -> DropdownState {
        if self.open.load(Ordering::SeqCst) {
            DropdownState::Open
        } else {
            DropdownState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == DropdownState::Open
    }

    pub fn toggle(&mut self) -> DropdownState {
        self.open.fetch_xor(true, Ordering::SeqCst);
        self.state()
    }

    /// Choosing an option closes the menu.
    pub fn select(&mut self, option: impl Into<String>) -> String {
        let option = option.into();
        self.selected = Some(option.clone());
        self.open.store(false, Ordering::SeqCst);
        option
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_pointer_down_closes_open_menu() {
        let hub = PointerHub::new();
        let mut sort = Dropdown::mount("sort-menu", &hub);
        assert_eq!(sort.toggle(), DropdownState::Open);

        hub.pointer_down(&PointerTarget::new(["sort-option-nama", "sort-menu", "body"]));
        assert!(sort.is_open());

        hub.pointer_down(&PointerTarget::new(["table", "body"]));
        assert!(!sort.is_open());
    }

    #[test]
    fn menus_have_independent_boundaries() {
        let hub = PointerHub::new();
        let mut sort = Dropdown::mount("sort-menu", &hub);
        let mut filter = Dropdown::mount("filter-menu", &hub);
        sort.toggle();
        filter.toggle();

        hub.pointer_down(&PointerTarget::new(["filter-menu", "body"]));
        assert!(!sort.is_open());
        assert!(filter.is_open());
    }

    #[test]
    fn selecting_an_option_closes() {
        let hub = PointerHub::new();
        let mut menu = Dropdown::mount("download-menu", &hub);
        menu.toggle();
        assert_eq!(menu.select("pdf"), "pdf");
        assert!(!menu.is_open());
        assert_eq!(menu.selected(), Some("pdf"));
    }

    #[test]
    fn unmount_removes_listener() {
        let hub = PointerHub::new();
        let menu = Dropdown::mount("sort-menu", &hub);
        let other = Dropdown::mount("filter-menu", &hub);
        assert_eq!(hub.listener_count(), 2);
        drop(menu);
        assert_eq!(hub.listener_count(), 1);
        drop(other);
        assert_eq!(hub.listener_count(), 0);
        hub.pointer_down(&PointerTarget::outside());
    }
}
