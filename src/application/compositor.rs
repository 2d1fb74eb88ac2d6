// Compositor - Draws the frame and the layout onto both planes
use crate::application::text_rasterizer::TextRasterizer;
use crate::domain::bit_plane::{BitPlane, Plane, MARK};
use crate::domain::layout::{LayoutPlan, PanelSize, RenderError};
use embedded_graphics::{
    prelude::*,
    primitives::{Line, PrimitiveStyle},
};
use std::sync::Arc;

/// The finished pair of planes for one render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planes {
    pub black: BitPlane,
    pub accent: BitPlane,
}

#[derive(Clone)]
pub struct Compositor {
    panel: PanelSize,
    rasterizer: Arc<dyn TextRasterizer>,
}

impl Compositor {
    pub fn new(panel: PanelSize, rasterizer: Arc<dyn TextRasterizer>) -> Self {
        Self { panel, rasterizer }
    }

    pub fn compose(&self, plan: &LayoutPlan) -> Result<Planes, RenderError> {
        plan.validate(self.panel)?;

        let mut black = BitPlane::new(self.panel.width, self.panel.height);
        let mut accent = BitPlane::new(self.panel.width, self.panel.height);

        draw_frame(&mut black, Plane::Black);
        draw_frame(&mut accent, Plane::Accent);

        for directive in plan.directives() {
            let target = match directive.plane {
                Plane::Black => &mut black,
                Plane::Accent => &mut accent,
            };
            self.rasterizer
                .draw_text(target, &directive.text, directive.area(), directive.font)?;
        }

        Ok(Planes { black, accent })
    }
}

/// Black frames the top and bottom edges, accent frames left and right.
fn draw_frame(plane: &mut BitPlane, which: Plane) {
    let right = plane.width() as i32 - 1;
    let bottom = plane.height() as i32 - 1;

    let edges = match which {
        Plane::Black => [
            (Point::new(0, 0), Point::new(right, 0)),
            (Point::new(0, bottom), Point::new(right, bottom)),
        ],
        Plane::Accent => [
            (Point::new(0, 0), Point::new(0, bottom)),
            (Point::new(right, 0), Point::new(right, bottom)),
        ],
    };

    let style = PrimitiveStyle::with_stroke(MARK, 1);
    for (start, end) in edges {
        // Infallible target
        let _ = Line::new(start, end).into_styled(style).draw(plane);
    }
}
