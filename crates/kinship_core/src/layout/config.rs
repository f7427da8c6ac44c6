//! Layout and rearrangement configuration.
//!
//! # Invariants
//! - Every field has a default; partial JSON input is accepted.
//! - Box size is re-derivable from the viewport width.

use crate::layout::engine::LayoutError;
use crate::layout::geometry::{Point, Size};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const COMPACT_VIEWPORT_MAX: f64 = 768.0;
const MEDIUM_VIEWPORT_MAX: f64 = 1200.0;

/// Geometry inputs of the layout engine and connector router, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub person_width: f64,
    pub person_height: f64,
    /// Horizontal padding kept between a unit's widest row and its slot edge.
    pub person_margin: f64,
    /// Edge-to-edge gap between adjacent boxes in a row or couple.
    pub min_person_spacing: f64,
    /// Vertical distance between consecutive generation levels.
    pub generation_height: f64,
    /// Minimum horizontal slot reserved for one family unit.
    pub family_unit_width: f64,
    pub max_siblings_per_row: usize,
    /// Extra vertical space between wrapped sibling rows.
    pub row_gutter: f64,
    /// How far above the top row a sibling bracket is drawn.
    pub sibling_bracket_offset: f64,
    /// Logical center; generation 0 is anchored at `center.y`.
    pub center: Point,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            person_width: 200.0,
            person_height: 100.0,
            person_margin: 20.0,
            min_person_spacing: 100.0,
            generation_height: 200.0,
            family_unit_width: 300.0,
            max_siblings_per_row: 6,
            row_gutter: 20.0,
            sibling_bracket_offset: 40.0,
            center: Point::new(2000.0, 1500.0),
        }
    }
}

impl LayoutConfig {
    pub fn person_size(&self) -> Size {
        Size::new(self.person_width, self.person_height)
    }

    /// Center-to-center distance between adjacent boxes in a row.
    pub fn pitch(&self) -> f64 {
        self.person_width + self.min_person_spacing
    }

    /// Vertical offset between wrapped sibling rows.
    pub fn row_height(&self) -> f64 {
        self.person_height + self.row_gutter
    }

    /// Copy with box size re-derived for a viewport `width` in pixels.
    pub fn for_viewport_width(&self, width: f64) -> Self {
        let (person_width, person_height) = if width <= COMPACT_VIEWPORT_MAX {
            (140.0, 70.0)
        } else if width <= MEDIUM_VIEWPORT_MAX {
            (160.0, 80.0)
        } else {
            (200.0, 100.0)
        };
        Self {
            person_width,
            person_height,
            ..self.clone()
        }
    }

    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    pub fn with_max_siblings_per_row(mut self, max: usize) -> Self {
        self.max_siblings_per_row = max;
        self
    }

    pub fn with_person_size(mut self, width: f64, height: f64) -> Self {
        self.person_width = width;
        self.person_height = height;
        self
    }

    pub fn with_min_person_spacing(mut self, spacing: f64) -> Self {
        self.min_person_spacing = spacing;
        self
    }

    pub fn with_generation_height(mut self, height: f64) -> Self {
        self.generation_height = height;
        self
    }

    /// # Errors
    /// - `InvalidConfig` for non-finite values, non-positive box or
    ///   generation sizes, negative spacing, or a zero row cap.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = [
            ("person_width", self.person_width),
            ("person_height", self.person_height),
            ("generation_height", self.generation_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let non_negative = [
            ("person_margin", self.person_margin),
            ("min_person_spacing", self.min_person_spacing),
            ("family_unit_width", self.family_unit_width),
            ("row_gutter", self.row_gutter),
            ("sibling_bracket_offset", self.sibling_bracket_offset),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.center.x.is_finite() || !self.center.y.is_finite() {
            return Err(LayoutError::InvalidConfig(
                "center must be finite".to_string(),
            ));
        }
        if self.max_siblings_per_row == 0 {
            return Err(LayoutError::InvalidConfig(
                "max_siblings_per_row must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full configuration of the rearrangement service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub layout: LayoutConfig,
    /// Settle budget granted to the view for its transition.
    pub rearrange_duration_ms: u64,
    /// Per-box delay added to the settle budget and to each box placement.
    pub stagger_delay_ms: u64,
    /// Quiet period before a viewport resize triggers a pass.
    pub resize_debounce_ms: u64,
    /// Quiet period before an external structural change triggers a pass.
    pub structure_debounce_ms: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            rearrange_duration_ms: 800,
            stagger_delay_ms: 50,
            resize_debounce_ms: 300,
            structure_debounce_ms: 100,
        }
    }
}

impl TreeConfig {
    pub fn rearrange_duration(&self) -> Duration {
        Duration::from_millis(self.rearrange_duration_ms)
    }

    pub fn stagger_delay(&self) -> Duration {
        Duration::from_millis(self.stagger_delay_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn structure_debounce(&self) -> Duration {
        Duration::from_millis(self.structure_debounce_ms)
    }

    /// Settle budget for a pass that places `box_count` boxes.
    pub fn settle_budget(&self, box_count: usize) -> Duration {
        let stagger = self
            .stagger_delay()
            .saturating_mul(u32::try_from(box_count).unwrap_or(u32::MAX));
        self.rearrange_duration().saturating_add(stagger)
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_rearrange_duration(mut self, duration: Duration) -> Self {
        self.rearrange_duration_ms = duration_ms(duration);
        self
    }

    pub fn with_stagger_delay(mut self, delay: Duration) -> Self {
        self.stagger_delay_ms = duration_ms(delay);
        self
    }

    pub fn with_resize_debounce(mut self, debounce: Duration) -> Self {
        self.resize_debounce_ms = duration_ms(debounce);
        self
    }

    pub fn with_structure_debounce(mut self, debounce: Duration) -> Self {
        self.structure_debounce_ms = duration_ms(debounce);
        self
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
