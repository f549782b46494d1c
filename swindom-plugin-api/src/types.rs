//! Window handle and window-event category types shared by host and plugins

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Raw OS window handle.
///
/// On Windows this is an `HWND` reinterpreted as an integer; elsewhere it is
/// whatever identifier the active event source reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    /// The null handle
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Set of window-event categories a plugin wants delivered.
///
/// Each category is a single bit. [`WindowEventType::NONE`] (0) means the
/// plugin wants no events and the host keeps no hook installed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowEventType(u32);

impl WindowEventType {
    pub const NONE: WindowEventType = WindowEventType(0);
    /// A window became the foreground window
    pub const FOREGROUND: WindowEventType = WindowEventType(1 << 0);
    /// A window started being moved or resized
    pub const MOVE_SIZE_START: WindowEventType = WindowEventType(1 << 1);
    /// A window finished being moved or resized
    pub const MOVE_SIZE_END: WindowEventType = WindowEventType(1 << 2);
    /// A window is about to be minimized
    pub const MINIMIZE_START: WindowEventType = WindowEventType(1 << 3);
    /// A window was restored from minimized
    pub const MINIMIZE_END: WindowEventType = WindowEventType(1 << 4);
    /// A window was created
    pub const CREATE: WindowEventType = WindowEventType(1 << 5);
    /// A window was shown
    pub const SHOW: WindowEventType = WindowEventType(1 << 6);
    /// A window was destroyed
    pub const DESTROY: WindowEventType = WindowEventType(1 << 7);
    /// A window was hidden
    pub const HIDE: WindowEventType = WindowEventType(1 << 8);
    /// A window's title changed
    pub const NAME_CHANGE: WindowEventType = WindowEventType(1 << 9);
    /// A window moved or changed size
    pub const LOCATION_CHANGE: WindowEventType = WindowEventType(1 << 10);

    const ALL: [(WindowEventType, &'static str); 11] = [
        (Self::FOREGROUND, "foreground"),
        (Self::MOVE_SIZE_START, "move_size_start"),
        (Self::MOVE_SIZE_END, "move_size_end"),
        (Self::MINIMIZE_START, "minimize_start"),
        (Self::MINIMIZE_END, "minimize_end"),
        (Self::CREATE, "create"),
        (Self::SHOW, "show"),
        (Self::DESTROY, "destroy"),
        (Self::HIDE, "hide"),
        (Self::NAME_CHANGE, "name_change"),
        (Self::LOCATION_CHANGE, "location_change"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Whether every category in `other` is also in `self`
    pub const fn contains(self, other: WindowEventType) -> bool {
        self.0 & other.0 == other.0
    }

    /// Iterate the single-category values contained in this set, lowest bit first
    pub fn categories(self) -> impl Iterator<Item = WindowEventType> {
        Self::ALL
            .into_iter()
            .map(|(category, _)| category)
            .filter(move |category| self.contains(*category))
    }
}

impl BitOr for WindowEventType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for WindowEventType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for WindowEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("WindowEventType(none)");
        }
        let names: Vec<&str> = Self::ALL
            .iter()
            .filter(|(category, _)| self.contains(*category))
            .map(|(_, name)| *name)
            .collect();
        let known = self.categories().fold(0, |acc, c| acc | c.0);
        if known == self.0 {
            write!(f, "WindowEventType({})", names.join(" | "))
        } else {
            write!(f, "WindowEventType({:#x})", self.0)
        }
    }
}

impl fmt::Display for WindowEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
