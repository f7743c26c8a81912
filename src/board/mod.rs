//! Board layout
//!
//! Pure and platform-free: the occupancy grid, the packer that tiles it, the
//! rule mapping footprint shapes to widget variants, and the pixel geometry
//! of the board on screen.

pub mod grid;
pub mod packer;

pub use grid::{Footprint, OccupancyGrid};
pub use packer::{PackedBoard, pack};

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Widget behaviour kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    Button,
    Slider,
    AudioSlider,
    Knob,
    Spinner,
    RapidFireButton,
    TapButton,
}

impl Variant {
    /// Variants that fit a 2x2 footprint
    pub const LARGE: [Variant; 4] = [
        Variant::Knob,
        Variant::Spinner,
        Variant::RapidFireButton,
        Variant::TapButton,
    ];
    /// Variants that fit a strip
    pub const LINEAR: [Variant; 2] = [Variant::Slider, Variant::AudioSlider];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Button => "button",
            Variant::Slider => "slider",
            Variant::AudioSlider => "audio-slider",
            Variant::Knob => "knob",
            Variant::Spinner => "spinner",
            Variant::RapidFireButton => "rapid-fire",
            Variant::TapButton => "tap-button",
        }
    }

    /// One-letter tag for text dumps
    pub fn glyph(&self) -> char {
        match self {
            Variant::Button => 'B',
            Variant::Slider => 'S',
            Variant::AudioSlider => 'A',
            Variant::Knob => 'K',
            Variant::Spinner => 'P',
            Variant::RapidFireButton => 'R',
            Variant::TapButton => 'T',
        }
    }
}

/// Track direction for linear widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Widget colours
pub const PALETTE: [&str; 8] = [
    "#3B82F6", "#10B981", "#F97316", "#EF4444", "#FBBF24", "#8B5CF6", "#14B8A6", "#EC4899",
];

/// Used if the palette draw ever comes back empty
pub const FALLBACK_COLOR: &str = "#4d96ff";

/// What to build at one footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetDescriptor {
    pub footprint: Footprint,
    pub variant: Variant,
    pub orientation: Orientation,
    pub color: &'static str,
}

/// Pick a variant (and track direction) that suits the footprint's shape
pub fn choose_variant<R: Rng + ?Sized>(footprint: &Footprint, rng: &mut R) -> (Variant, Orientation) {
    if footprint.is_large() {
        let variant = *Variant::LARGE.choose(rng).unwrap_or(&Variant::Knob);
        (variant, Orientation::Vertical)
    } else if footprint.height > 1 {
        let variant = *Variant::LINEAR.choose(rng).unwrap_or(&Variant::Slider);
        (variant, Orientation::Vertical)
    } else if footprint.width > 1 {
        let variant = *Variant::LINEAR.choose(rng).unwrap_or(&Variant::Slider);
        (variant, Orientation::Horizontal)
    } else {
        (Variant::Button, Orientation::Vertical)
    }
}

/// Assign a variant and colour to every footprint of a packed board
pub fn describe<R: Rng + ?Sized>(board: &PackedBoard, rng: &mut R) -> Vec<WidgetDescriptor> {
    board
        .footprints
        .iter()
        .map(|footprint| {
            let (variant, orientation) = choose_variant(footprint, rng);
            let color = PALETTE.choose(rng).copied().unwrap_or(FALLBACK_COLOR);
            WidgetDescriptor {
                footprint: *footprint,
                variant,
                orientation,
                color,
            }
        })
        .collect()
}

/// Text picture of a described board, one glyph per cell, rows top to bottom
pub fn render_ascii(cols: u32, rows: u32, descriptors: &[WidgetDescriptor]) -> String {
    let mut cells = vec!['.'; (cols * rows) as usize];
    for d in descriptors {
        for (x, y) in d.footprint.cells() {
            if x < cols && y < rows {
                cells[(y * cols + x) as usize] = d.variant.glyph();
            }
        }
    }
    cells
        .chunks(cols as usize)
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Board size in cells and its pixel geometry on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub cols: u32,
    pub rows: u32,
    /// Edge length of one cell (pixels)
    pub cell_size: f32,
    /// Top-left corner of the board in viewport pixels
    pub origin: Vec2,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            cell_size: MAX_CELL_SIZE,
            origin: Vec2::ZERO,
        }
    }
}

impl BoardConfig {
    /// Fit the default board into a viewport, centred, cells capped at
    /// `MAX_CELL_SIZE`
    pub fn fit(viewport_w: f32, viewport_h: f32) -> Self {
        Self::fit_grid(GRID_COLS, GRID_ROWS, viewport_w, viewport_h)
    }

    pub fn fit_grid(cols: u32, rows: u32, viewport_w: f32, viewport_h: f32) -> Self {
        let available_w = (viewport_w - VIEWPORT_MARGIN * 2.0).max(0.0);
        let available_h = (viewport_h - VIEWPORT_MARGIN * 2.0).max(0.0);

        let by_width = available_w / cols as f32;
        let by_height = available_h / rows as f32;
        let cell_size = by_width.min(by_height).min(MAX_CELL_SIZE);

        let board_w = cell_size * cols as f32;
        let board_h = cell_size * rows as f32;

        Self {
            cols,
            rows,
            cell_size,
            origin: Vec2::new((viewport_w - board_w) / 2.0, (viewport_h - board_h) / 2.0),
        }
    }

    /// Board size in pixels
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            self.cols as f32 * self.cell_size,
            self.rows as f32 * self.cell_size,
        )
    }

    /// Widget position (board-relative) and size for a footprint
    pub fn widget_rect(&self, footprint: &Footprint) -> (Vec2, Vec2) {
        let pos = Vec2::new(
            footprint.x as f32 * self.cell_size + WIDGET_MARGIN / 2.0,
            footprint.y as f32 * self.cell_size + WIDGET_MARGIN / 2.0,
        );
        let size = Vec2::new(
            footprint.width as f32 * self.cell_size - WIDGET_MARGIN,
            footprint.height as f32 * self.cell_size - WIDGET_MARGIN,
        )
        .max(Vec2::ONE);
        (pos, size)
    }

    /// Outline width for widget borders (scales with the cell)
    pub fn border_width(&self) -> f32 {
        (self.cell_size * 0.02).round().max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_variant_rule_by_shape() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            let (v, _) = choose_variant(&Footprint::new(0, 0, 2, 2), &mut rng);
            assert!(Variant::LARGE.contains(&v));

            let (v, o) = choose_variant(&Footprint::new(0, 0, 1, 3), &mut rng);
            assert!(Variant::LINEAR.contains(&v));
            assert_eq!(o, Orientation::Vertical);

            let (v, o) = choose_variant(&Footprint::new(0, 0, 2, 1), &mut rng);
            assert!(Variant::LINEAR.contains(&v));
            assert_eq!(o, Orientation::Horizontal);

            let (v, _) = choose_variant(&Footprint::new(0, 0, 1, 1), &mut rng);
            assert_eq!(v, Variant::Button);
        }
    }

    #[test]
    fn test_describe_covers_every_footprint() {
        let mut rng = Pcg32::seed_from_u64(11);
        let board = pack(3, 6, &mut rng);
        let descriptors = describe(&board, &mut rng);
        assert_eq!(descriptors.len(), board.footprints.len());
        for d in &descriptors {
            assert!(PALETTE.contains(&d.color));
        }
    }

    #[test]
    fn test_render_ascii_fills_every_cell() {
        let mut rng = Pcg32::seed_from_u64(3);
        let board = pack(3, 6, &mut rng);
        let descriptors = describe(&board, &mut rng);
        let text = render_ascii(3, 6, &descriptors);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| line.chars().count() == 3));
        assert!(!text.contains('.'));
    }

    #[test]
    fn test_fit_caps_cell_size_and_centres() {
        let config = BoardConfig::fit(2000.0, 2000.0);
        assert_eq!(config.cell_size, MAX_CELL_SIZE);
        assert_eq!(config.origin, Vec2::new(775.0, 550.0));

        // Narrow viewport: width-bound
        let config = BoardConfig::fit(340.0, 2000.0);
        assert_eq!(config.cell_size, 100.0);
        assert_eq!(config.origin.x, 20.0);
    }

    #[test]
    fn test_widget_rect_insets_margin() {
        let config = BoardConfig {
            cell_size: 100.0,
            ..BoardConfig::default()
        };
        let (pos, size) = config.widget_rect(&Footprint::new(1, 2, 2, 2));
        assert_eq!(pos, Vec2::new(108.0, 208.0));
        assert_eq!(size, Vec2::new(184.0, 184.0));
        assert_eq!(config.border_width(), 2.0);
    }
}
