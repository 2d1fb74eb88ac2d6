// Layout plan: where each string lands on which plane
use embedded_graphics::{prelude::*, primitives::Rectangle};
use thiserror::Error;

use super::bit_plane::Plane;
use super::reading::Snapshot;
use super::staleness::Freshness;

/// Source ids the layout knows how to place.
pub mod reading_id {
    pub const SOLAR_NOW: &str = "solar_now";
    pub const SOLAR_TODAY: &str = "solar_today";
    pub const BILL_PROJECTION: &str = "bill_projection";
    pub const MASTER_BEDROOM_TEMP: &str = "master_bedroom_temp";
    pub const SECOND_FLOOR_TEMP: &str = "second_floor_temp";
    pub const HEAT_LOAD_EAST: &str = "heat_load_east";
    pub const HEAT_LOAD_WEST: &str = "heat_load_west";
    pub const HEAT_LOAD_FORCED_AIR: &str = "heat_load_forced_air";
    pub const BOILER_SET_POINT: &str = "boiler_set_point";
    pub const NET_METERING: &str = "net_metering";
    pub const NET_LAST_UPDATE: &str = "net_last_update";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontSpec {
    pub size: u32,
    pub weight: FontWeight,
}

impl FontSpec {
    pub const fn new(size: u32, weight: FontWeight) -> Self {
        Self { size, weight }
    }
}

pub const LABEL_FONT: FontSpec = FontSpec::new(15, FontWeight::Bold);
pub const SMALL_VALUE_FONT: FontSpec = FontSpec::new(15, FontWeight::Regular);
pub const LARGE_VALUE_FONT: FontSpec = FontSpec::new(30, FontWeight::Regular);

/// Every font the plan can ask for; all must resolve before a cycle starts.
pub const REQUIRED_FONTS: [FontSpec; 3] = [LABEL_FONT, SMALL_VALUE_FONT, LARGE_VALUE_FONT];

// Hand-tuned cursor increments and columns
const TOP_MARGIN: i32 = 6;
const LEFT_MARGIN: i32 = 6;
/// Last column inside the accent frame.
const CONTENT_RIGHT: i32 = PanelSize::PORTRAIT.width as i32 - 2;
/// Widest 15 px face any label family provides (profont 14 pt).
const LABEL_GLYPH_WIDTH: i32 = 10;
/// Characters in the longest row label, "Boiler:".
const ROW_LABEL_CHARS: i32 = 7;
const COLUMN_GAP: i32 = 2;
const VALUE_COLUMN: i32 = LEFT_MARGIN + ROW_LABEL_CHARS * LABEL_GLYPH_WIDTH + COLUMN_GAP;
const HEAT_COLUMNS: [i32; 3] = [6, 54, 102];
const HEAT_COLUMN_WIDTH: i32 = 45;
const LABEL_ROW: i32 = 15;
const SMALL_ROW: i32 = 17;
const LARGE_ROW: i32 = 30;
const SECTION_GAP: i32 = 6;

pub const NET_LABEL: &str = "Net";
pub const NET_STALE_LABEL: &str = "Net (stale)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSize {
    pub width: u32,
    pub height: u32,
}

impl PanelSize {
    pub const PORTRAIT: PanelSize = PanelSize {
        width: 152,
        height: 296,
    };

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDirective {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub plane: Plane,
    pub font: FontSpec,
    /// Text past this many pixels from `x` is clipped.
    pub max_width: u32,
}

impl LayoutDirective {
    /// The slot this directive may draw into. Only the width is bounded.
    pub fn area(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.x, self.y),
            Size::new(self.max_width, self.font.size * 2),
        )
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font family {family:?} has no {size}px face")]
    FontNotFound { family: String, size: u32 },
    #[error("directive {text:?} at ({x}, {y}) lies outside the {width}x{height} panel")]
    OutOfBounds {
        text: String,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutPlan {
    directives: Vec<LayoutDirective>,
}

impl LayoutPlan {
    pub fn directives(&self) -> &[LayoutDirective] {
        &self.directives
    }

    #[cfg(test)]
    pub fn on_plane(&self, plane: Plane) -> impl Iterator<Item = &LayoutDirective> {
        self.directives.iter().filter(move |d| d.plane == plane)
    }

    pub fn validate(&self, panel: PanelSize) -> Result<(), RenderError> {
        let outside = |d: &&LayoutDirective| {
            let right = d.x + d.max_width as i32 - 1;
            d.max_width == 0 || !panel.contains(d.x, d.y) || !panel.contains(right, d.y)
        };
        match self.directives.iter().find(outside) {
            Some(d) => Err(RenderError::OutOfBounds {
                text: d.text.clone(),
                x: d.x,
                y: d.y,
                width: panel.width,
                height: panel.height,
            }),
            None => Ok(()),
        }
    }

    /// Lay out the dashboard top to bottom. Accent carries labels, black carries values.
    pub fn build(snapshot: &Snapshot, net_freshness: Freshness) -> Self {
        use reading_id::*;

        let mut b = PlanBuilder::new();

        b.label("Solar now");
        b.advance(LABEL_ROW);
        b.wide_value(snapshot.value_of(SOLAR_NOW), LARGE_VALUE_FONT);
        b.advance(LARGE_ROW);

        b.labeled_row("Today:", snapshot.value_of(SOLAR_TODAY), SMALL_VALUE_FONT);
        b.advance(SMALL_ROW);
        b.labeled_row("Proj:", snapshot.value_of(BILL_PROJECTION), SMALL_VALUE_FONT);
        b.advance(SMALL_ROW);
        b.advance(SECTION_GAP);

        b.labeled_row("MBR:", snapshot.value_of(MASTER_BEDROOM_TEMP), LARGE_VALUE_FONT);
        b.advance(LARGE_ROW);
        b.labeled_row("2F:", snapshot.value_of(SECOND_FLOOR_TEMP), LARGE_VALUE_FONT);
        b.advance(LARGE_ROW);
        b.advance(SECTION_GAP);

        b.label("Heat E/W/FA");
        b.advance(LABEL_ROW);
        let loads = [HEAT_LOAD_EAST, HEAT_LOAD_WEST, HEAT_LOAD_FORCED_AIR];
        for (x, id) in HEAT_COLUMNS.into_iter().zip(loads) {
            b.value(x, HEAT_COLUMN_WIDTH, snapshot.value_of(id), SMALL_VALUE_FONT);
        }
        b.advance(SMALL_ROW);
        b.labeled_row("Boiler:", snapshot.value_of(BOILER_SET_POINT), SMALL_VALUE_FONT);
        b.advance(SMALL_ROW);
        b.advance(SECTION_GAP);

        let net_label = if net_freshness.is_fresh() {
            NET_LABEL
        } else {
            NET_STALE_LABEL
        };
        b.label(net_label);
        b.advance(LABEL_ROW);
        b.wide_value(snapshot.value_of(NET_METERING), LARGE_VALUE_FONT);
        b.advance(LARGE_ROW);
        b.labeled_row("Upd:", snapshot.value_of(NET_LAST_UPDATE), SMALL_VALUE_FONT);

        b.finish()
    }
}

struct PlanBuilder {
    y: i32,
    directives: Vec<LayoutDirective>,
}

impl PlanBuilder {
    fn new() -> Self {
        Self {
            y: TOP_MARGIN,
            directives: Vec::new(),
        }
    }

    fn advance(&mut self, rows: i32) {
        self.y += rows;
    }

    fn push(&mut self, x: i32, max_width: i32, text: &str, plane: Plane, font: FontSpec) {
        self.directives.push(LayoutDirective {
            text: text.to_string(),
            x,
            y: self.y,
            plane,
            font,
            max_width: max_width as u32,
        });
    }

    /// A label on a row of its own.
    fn label(&mut self, text: &str) {
        self.push(LEFT_MARGIN, CONTENT_RIGHT - LEFT_MARGIN + 1, text, Plane::Accent, LABEL_FONT);
    }

    fn value(&mut self, x: i32, max_width: i32, text: &str, font: FontSpec) {
        self.push(x, max_width, text, Plane::Black, font);
    }

    fn wide_value(&mut self, text: &str, font: FontSpec) {
        self.value(LEFT_MARGIN, CONTENT_RIGHT - LEFT_MARGIN + 1, text, font);
    }

    fn labeled_row(&mut self, label: &str, value: &str, font: FontSpec) {
        self.push(
            LEFT_MARGIN,
            VALUE_COLUMN - COLUMN_GAP - LEFT_MARGIN,
            label,
            Plane::Accent,
            LABEL_FONT,
        );
        self.value(VALUE_COLUMN, CONTENT_RIGHT - VALUE_COLUMN + 1, value, font);
    }

    fn finish(self) -> LayoutPlan {
        LayoutPlan {
            directives: self.directives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::Reading;

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.readings.insert(
            reading_id::SOLAR_NOW.to_string(),
            Reading::ok("solar now", "1.23 kW".to_string(), 1234.5),
        );
        snapshot.readings.insert(
            reading_id::MASTER_BEDROOM_TEMP.to_string(),
            Reading::ok("master bedroom", "72°".to_string(), 72.0),
        );
        snapshot
    }

    #[test]
    fn test_plan_fits_portrait_panel() {
        let plan = LayoutPlan::build(&snapshot(), Freshness::Fresh);
        assert!(plan.validate(PanelSize::PORTRAIT).is_ok());
        assert!(plan.directives().len() > 10);
    }

    #[test]
    fn test_labels_on_accent_values_on_black() {
        let plan = LayoutPlan::build(&snapshot(), Freshness::Fresh);

        let labels: Vec<&str> = plan.on_plane(Plane::Accent).map(|d| d.text.as_str()).collect();
        assert!(labels.contains(&"MBR:"));
        assert!(labels.contains(&"2F:"));
        assert!(labels.contains(&NET_LABEL));
        assert!(plan.on_plane(Plane::Accent).all(|d| d.font == LABEL_FONT));

        let values: Vec<&str> = plan.on_plane(Plane::Black).map(|d| d.text.as_str()).collect();
        assert_eq!(values[0], "1.23 kW");
        assert!(values.contains(&"72°"));
    }

    #[test]
    fn test_cursor_increments_are_fixed() {
        let plan = LayoutPlan::build(&snapshot(), Freshness::Fresh);
        let d = plan.directives();

        assert_eq!((d[0].text.as_str(), d[0].y), ("Solar now", TOP_MARGIN));
        assert_eq!(d[1].y, TOP_MARGIN + LABEL_ROW);
        assert_eq!(d[2].y, TOP_MARGIN + LABEL_ROW + LARGE_ROW);

        // Changing a value's length never moves anything
        let mut longer = snapshot();
        longer.readings.insert(
            reading_id::SOLAR_NOW.to_string(),
            Reading::unavailable("solar now"),
        );
        let other = LayoutPlan::build(&longer, Freshness::Fresh);
        let positions = |p: &LayoutPlan| p.directives().iter().map(|d| (d.x, d.y)).collect::<Vec<_>>();
        assert_eq!(positions(&plan), positions(&other));
    }

    #[test]
    fn test_stale_net_metering_changes_label() {
        let plan = LayoutPlan::build(&snapshot(), Freshness::Stale);
        assert!(plan.on_plane(Plane::Accent).any(|d| d.text == NET_STALE_LABEL));
        assert!(!plan.on_plane(Plane::Accent).any(|d| d.text == NET_LABEL));

        let unknown = LayoutPlan::build(&snapshot(), Freshness::Unknown);
        assert!(unknown.on_plane(Plane::Accent).any(|d| d.text == NET_STALE_LABEL));
    }

    #[test]
    fn test_missing_readings_render_placeholder() {
        let plan = LayoutPlan::build(&Snapshot::default(), Freshness::Fresh);
        let values: Vec<&str> = plan.on_plane(Plane::Black).map(|d| d.text.as_str()).collect();
        assert!(values.iter().all(|v| *v == "err"));
    }

    #[test]
    fn test_slots_on_a_plane_never_overlap() {
        let plan = LayoutPlan::build(&snapshot(), Freshness::Stale);
        for plane in [Plane::Black, Plane::Accent] {
            let slots: Vec<&LayoutDirective> = plan.on_plane(plane).collect();
            for (i, a) in slots.iter().enumerate() {
                for b in &slots[i + 1..] {
                    if a.y != b.y {
                        continue;
                    }
                    let (left, right) = if a.x < b.x { (a, b) } else { (b, a) };
                    assert!(
                        left.x + left.max_width as i32 <= right.x,
                        "{:?} runs into {:?}",
                        left.text,
                        right.text
                    );
                }
            }
        }
    }

    #[test]
    fn test_row_labels_end_before_value_column() {
        let plan = LayoutPlan::build(&snapshot(), Freshness::Fresh);
        for label in plan.on_plane(Plane::Accent) {
            let chars = label.text.chars().count() as i32;
            if label.max_width as i32 == VALUE_COLUMN - COLUMN_GAP - LEFT_MARGIN {
                assert!(chars <= ROW_LABEL_CHARS, "{:?} is longer than the label column", label.text);
            }
        }
        // every slot stays inside the frame
        assert!(plan
            .directives()
            .iter()
            .all(|d| d.x + d.max_width as i32 - 1 <= CONTENT_RIGHT));
    }

    #[test]
    fn test_validate_rejects_small_panel() {
        let plan = LayoutPlan::build(&snapshot(), Freshness::Fresh);
        let landscape = PanelSize {
            width: 296,
            height: 152,
        };
        assert!(matches!(
            plan.validate(landscape),
            Err(RenderError::OutOfBounds { .. })
        ));
    }
}
