//! Shared crate-wide constants.
//!
//! These are the defaults behind [`crate::config::FloaterConfig`]. Units are
//! canvas pixels unless stated otherwise; the terminal front end scales them
//! down to cells through its own config.

/// Distance within which a dragged edge is pulled onto a nearby edge.
pub const DEFAULT_SNAP_MARGIN: i32 = 5;

/// Width of a minimized tile.
pub const DEFAULT_MINIMIZED_WIDTH: i32 = 160;

/// Size given to a floater opened without a rect.
pub const DEFAULT_FLOATER_WIDTH: i32 = 300;
pub const DEFAULT_FLOATER_HEIGHT: i32 = 200;

/// Height of the title bar. A minimized tile is exactly one header tall.
pub const DEFAULT_HEADER_HEIGHT: i32 = 18;

/// Edge length of a title-bar button at full scale.
pub const DEFAULT_BUTTON_SIZE: i32 = 16;

/// Percentage applied to button size while a floater is hosted in tabs.
pub const HOSTED_BUTTON_SCALE_PERCENT: i32 = 90;

/// Height of a tabbed host's tab strip.
pub const DEFAULT_TAB_HEIGHT: i32 = 16;

/// Width of a single tab label.
pub const DEFAULT_TAB_WIDTH: i32 = 80;

/// Border thickness of a tabbed host around its content area.
pub const DEFAULT_HOST_BORDER: i32 = 2;

/// Thickness of the edge resize bars.
pub const DEFAULT_RESIZE_BAR_THICKNESS: i32 = 3;

/// Edge length of the square corner resize handles.
pub const DEFAULT_RESIZE_CORNER_SIZE: i32 = 11;

/// Minimum number of pixels of a floater that must stay within the usable
/// rect when it is allowed to hang partially outside.
pub const DEFAULT_KEEP_ONSCREEN: i32 = 16;

/// Diagonal step between successive cascaded floaters.
pub const DEFAULT_CASCADE_STEP: i32 = 25;

/// Inset from the usable rect where cascading starts.
pub const DEFAULT_CASCADE_INSET: i32 = 16;

/// Distance within which a dependent counts as adjacent to its dependee when
/// probing for a free neighboring spot.
pub const DEFAULT_NEIGHBOR_SEARCH_MARGIN: i32 = 10;

/// Amount the neighbor search relaxes its margins on every retry.
pub const DEFAULT_NEIGHBOR_SEARCH_STEP: i32 = 20;

/// Number of relaxation rounds before the neighbor search gives up.
pub const NEIGHBOR_SEARCH_ATTEMPTS: usize = 5;

/// Vertical excursion of a title drag that undocks or tears off a floater.
pub const DEFAULT_UNDOCK_THRESHOLD: i32 = 20;

/// Tab-strip auto-scroll rate when scrolling begins, in pixels per frame.
pub const DEFAULT_AUTOSCROLL_MIN_RATE: f32 = 2.0;

/// Tab-strip auto-scroll rate ceiling, in pixels per frame.
pub const DEFAULT_AUTOSCROLL_MAX_RATE: f32 = 12.0;

/// Frames it takes auto-scroll to accelerate from the minimum to the maximum
/// rate.
pub const AUTOSCROLL_RAMP_FRAMES: f32 = 30.0;

/// Offset of a torn-off floater from its former host's content origin.
pub const TEAR_OFF_OFFSET: i32 = 5;

/// Upper bound on parent-chain walks. Deeper chains indicate a corrupt
/// hierarchy and are treated as unrelated.
pub const MAX_VIEW_DEPTH: usize = 64;

/// Largest gap between two clicks on the same spot that still counts as a
/// double-click.
pub const DOUBLE_CLICK_MILLIS: u64 = 400;
