//! Account menu shown in the page header.

use tracing::warn;

/// What a menu entry asks the front end to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Open the profile page.
    Profile,
    /// Open the order history.
    Orders,
    /// Log out; the caller runs the auth service's logout.
    Logout,
}

impl MenuAction {
    /// Menu entries in display order.
    pub const ALL: [Self; 3] = [Self::Profile, Self::Orders, Self::Logout];

    /// Entry at a menu position.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Profile),
            1 => Some(Self::Orders),
            2 => Some(Self::Logout),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Orders => "Orders",
            Self::Logout => "Log out",
        }
    }
}

/// Popover and navigation state of the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderMenu {
    popover_open: bool,
    active_nav_item: usize,
}

impl HeaderMenu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_popover_open(&self) -> bool {
        self.popover_open
    }

    pub const fn toggle_popover(&mut self) {
        self.popover_open = !self.popover_open;
    }

    /// Close the popover, e.g. on a click outside it.
    pub const fn close_popover(&mut self) {
        self.popover_open = false;
    }

    /// Handle a click on the menu entry at `index`.
    ///
    /// The popover closes whatever was clicked. Unknown positions are logged
    /// and yield no action.
    pub fn select(&mut self, index: usize) -> Option<MenuAction> {
        self.popover_open = false;
        let action = MenuAction::from_index(index);
        if action.is_none() {
            warn!(index, "No action for header menu item");
        }
        action
    }

    #[must_use]
    pub const fn active_nav_item(&self) -> usize {
        self.active_nav_item
    }

    pub const fn set_active_nav_item(&mut self, index: usize) {
        self.active_nav_item = index;
    }
}
