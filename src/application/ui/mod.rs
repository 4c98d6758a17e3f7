//! Headless list-page and widget state, independent of any renderer.

pub mod controller;
pub mod debounce;
pub mod dropdown;
pub mod modal;
pub mod synchronizer;

pub use controller::{ListController, NavigationOutcome, Navigator};
pub use debounce::{DEFAULT_SEARCH_DEBOUNCE, Debouncer};
pub use dropdown::{Dropdown, DropdownState, ListenerGuard, PointerHub, PointerTarget};
pub use modal::{Modal, RefreshIntent};
pub use synchronizer::{Synchronizer, Visit, VisitMode};
