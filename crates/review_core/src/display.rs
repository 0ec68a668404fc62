//! Rendering-engine seam and the draw sequence the pipeline drives through it.

use shared::protocol::MoleculeResponse;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unsupported structure format '{0}'")]
    UnsupportedFormat(String),
    #[error("structure content rejected: {0}")]
    Rejected(String),
    #[error("display surface unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub stick_radius: f32,
    pub sphere_scale: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            stick_radius: 0.15,
            sphere_scale: 0.18,
        }
    }
}

/// A stateful 3D viewer. Implementations keep one model loaded at a time.
pub trait DisplaySurface {
    fn clear(&mut self);
    fn resize(&mut self);
    fn load_model(&mut self, content: &str, format: &str) -> Result<(), RenderError>;
    fn apply_style(&mut self, style: &RenderStyle);
    fn zoom_to_fit(&mut self);
    fn render(&mut self) -> Result<(), RenderError>;
}

pub fn draw_molecule<S: DisplaySurface + ?Sized>(
    surface: &mut S,
    molecule: &MoleculeResponse,
    style: &RenderStyle,
) -> Result<(), RenderError> {
    surface.clear();
    surface.resize();
    surface.load_model(&molecule.content, &molecule.format)?;
    surface.apply_style(style);
    surface.zoom_to_fit();
    surface.render()
}

/// Host surface changed size; re-fit the current frame without refetching.
pub fn redraw<S: DisplaySurface + ?Sized>(surface: &mut S) -> Result<(), RenderError> {
    surface.resize();
    surface.render()
}
