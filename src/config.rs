use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::*;
use crate::error::ConfigError;

/// Tunables consumed by the canvas, floaters and their handles.
///
/// Every field has a default, so a JSON file only needs to mention the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FloaterConfig {
    pub snap_margin: i32,
    pub default_width: i32,
    pub default_height: i32,
    pub minimized_width: i32,
    pub header_height: i32,
    pub button_size: i32,
    pub tab_height: i32,
    pub tab_width: i32,
    pub host_border: i32,
    pub resize_bar_thickness: i32,
    pub resize_corner_size: i32,
    pub keep_onscreen: i32,
    pub cascade_step: i32,
    pub cascade_inset: i32,
    pub neighbor_search_margin: i32,
    pub neighbor_search_step: i32,
    pub undock_threshold: i32,
    pub autoscroll_min_rate: f32,
    pub autoscroll_max_rate: f32,
}

impl Default for FloaterConfig {
    fn default() -> Self {
        Self {
            snap_margin: DEFAULT_SNAP_MARGIN,
            default_width: DEFAULT_FLOATER_WIDTH,
            default_height: DEFAULT_FLOATER_HEIGHT,
            minimized_width: DEFAULT_MINIMIZED_WIDTH,
            header_height: DEFAULT_HEADER_HEIGHT,
            button_size: DEFAULT_BUTTON_SIZE,
            tab_height: DEFAULT_TAB_HEIGHT,
            tab_width: DEFAULT_TAB_WIDTH,
            host_border: DEFAULT_HOST_BORDER,
            resize_bar_thickness: DEFAULT_RESIZE_BAR_THICKNESS,
            resize_corner_size: DEFAULT_RESIZE_CORNER_SIZE,
            keep_onscreen: DEFAULT_KEEP_ONSCREEN,
            cascade_step: DEFAULT_CASCADE_STEP,
            cascade_inset: DEFAULT_CASCADE_INSET,
            neighbor_search_margin: DEFAULT_NEIGHBOR_SEARCH_MARGIN,
            neighbor_search_step: DEFAULT_NEIGHBOR_SEARCH_STEP,
            undock_threshold: DEFAULT_UNDOCK_THRESHOLD,
            autoscroll_min_rate: DEFAULT_AUTOSCROLL_MIN_RATE,
            autoscroll_max_rate: DEFAULT_AUTOSCROLL_MAX_RATE,
        }
    }
}

impl FloaterConfig {
    /// Scale suited to a character-cell terminal where one unit is one cell.
    pub fn terminal() -> Self {
        Self {
            snap_margin: 1,
            default_width: 36,
            default_height: 10,
            minimized_width: 18,
            header_height: 1,
            button_size: 1,
            tab_height: 1,
            tab_width: 12,
            host_border: 1,
            resize_bar_thickness: 1,
            resize_corner_size: 1,
            keep_onscreen: 4,
            cascade_step: 2,
            cascade_inset: 1,
            neighbor_search_margin: 1,
            neighbor_search_step: 2,
            undock_threshold: 2,
            autoscroll_min_rate: 0.25,
            autoscroll_max_rate: 2.0,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the geometry degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("default_width", self.default_width),
            ("default_height", self.default_height),
            ("minimized_width", self.minimized_width),
            ("header_height", self.header_height),
            ("tab_width", self.tab_width),
            ("cascade_step", self.cascade_step),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        if self.snap_margin < 0 {
            return Err(ConfigError::Invalid {
                field: "snap_margin",
                reason: "must not be negative".to_string(),
            });
        }
        if self.autoscroll_max_rate < self.autoscroll_min_rate {
            return Err(ConfigError::Invalid {
                field: "autoscroll_max_rate",
                reason: "must be at least autoscroll_min_rate".to_string(),
            });
        }
        Ok(())
    }

    /// Minimized tiles are one header tall.
    pub fn minimized_height(&self) -> i32 {
        self.header_height
    }

    /// Button edge length at the given hosted state.
    pub fn scaled_button_size(&self, hosted: bool) -> i32 {
        if hosted {
            // Never scale a visible button down to nothing.
            (self.button_size * HOSTED_BUTTON_SCALE_PERCENT / 100).max(self.button_size.min(1))
        } else {
            self.button_size
        }
    }
}
