// Text rasterization capability injected into the compositor
use crate::domain::bit_plane::BitPlane;
use crate::domain::layout::{FontSpec, RenderError};
use embedded_graphics::primitives::Rectangle;

pub trait TextRasterizer: Send + Sync {
    /// Draw `text` with its top-left corner at the corner of `area`.
    /// Pixels outside `area` or past the plane edge are clipped.
    fn draw_text(
        &self,
        plane: &mut BitPlane,
        text: &str,
        area: Rectangle,
        font: FontSpec,
    ) -> Result<(), RenderError>;

    /// Check up front that every font the layout needs can be drawn.
    fn ensure_fonts(&self, fonts: &[FontSpec]) -> Result<(), RenderError>;
}
