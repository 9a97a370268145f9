pub mod canvas;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod floater;
pub mod focus;
pub mod geometry;
pub mod host;
pub mod input;
pub mod keybindings;
pub mod modal;
pub mod persist;
pub mod render;
pub mod runner;
pub mod theme;
pub mod tracing_sub;
pub mod ui;

pub use canvas::{CloseOutcome, DrawList, WindowCanvas};
pub use config::FloaterConfig;
pub use floater::{Capabilities, FloaterId, FloaterParams, ViewId};
pub use geometry::{Point, Rect};
