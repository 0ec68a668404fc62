//! Text front end: a display surface that summarizes models instead of
//! drawing them, and the line-based input surface.

use std::io::Write;

use review_core::{
    DisplaySurface, Focus, Intent, Key, RenderError, RenderStyle, ReviewEvent, ReviewView,
};

const SUPPORTED_FORMATS: &[&str] = &["pdb", "pqr", "cif", "mmcif", "xyz", "sdf", "mol", "mol2"];
const DEFAULT_COLUMNS: u16 = 80;

pub const HELP: &str = "\
commands: a/enter/right = accept, d/left = decline, b/up/backspace = back,
          open <folder>, browse, resize, help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
struct LoadedModel {
    format: String,
    atoms: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AppliedStyle {
    stick_radius: f32,
    sphere_scale: f32,
}

pub struct TerminalSurface<W: Write> {
    out: W,
    columns: u16,
    model: Option<LoadedModel>,
    style: Option<AppliedStyle>,
    zoomed: bool,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            columns: DEFAULT_COLUMNS,
            model: None,
            style: None,
            zoomed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn clear(&mut self) {
        self.model = None;
        self.style = None;
        self.zoomed = false;
    }

    fn resize(&mut self) {
        self.columns = std::env::var("COLUMNS")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_COLUMNS);
    }

    fn load_model(&mut self, content: &str, format: &str) -> Result<(), RenderError> {
        let format = format.trim().to_ascii_lowercase();
        if !SUPPORTED_FORMATS.contains(&format.as_str()) {
            return Err(RenderError::UnsupportedFormat(format));
        }
        let atoms = count_atoms(content, &format);
        if atoms == 0 {
            return Err(RenderError::Rejected("no atoms found".into()));
        }
        self.model = Some(LoadedModel { format, atoms });
        Ok(())
    }

    fn apply_style(&mut self, style: &RenderStyle) {
        self.style = Some(AppliedStyle {
            stick_radius: style.stick_radius,
            sphere_scale: style.sphere_scale,
        });
    }

    fn zoom_to_fit(&mut self) {
        self.zoomed = self.model.is_some();
    }

    fn render(&mut self) -> Result<(), RenderError> {
        let line = match (&self.model, &self.style) {
            (Some(model), Some(style)) => format!(
                "[viewer {} cols] {} model, {} atoms, sticks {:.2} / spheres {:.2}{}",
                self.columns,
                model.format,
                model.atoms,
                style.stick_radius,
                style.sphere_scale,
                if self.zoomed { ", fit to view" } else { "" },
            ),
            (Some(model), None) => format!(
                "[viewer {} cols] {} model, {} atoms",
                self.columns, model.format, model.atoms
            ),
            (None, _) => format!("[viewer {} cols] empty", self.columns),
        };
        writeln!(self.out, "{line}").map_err(|_| RenderError::Unavailable)
    }
}

fn count_atoms(content: &str, format: &str) -> usize {
    let mut lines = content.lines();
    match format {
        "pdb" | "pqr" => lines
            .filter(|line| line.starts_with("ATOM") || line.starts_with("HETATM"))
            .count(),
        "xyz" => lines
            .next()
            .and_then(|line| line.trim().parse().ok())
            .unwrap_or(0),
        "sdf" | "mol" => lines
            .nth(3)
            .and_then(|counts| counts.get(..3))
            .and_then(|field| field.trim().parse().ok())
            .unwrap_or(0),
        "mol2" => lines
            .skip_while(|line| !line.starts_with("@<TRIPOS>ATOM"))
            .skip(1)
            .take_while(|line| !line.starts_with("@<TRIPOS>"))
            .filter(|line| !line.trim().is_empty())
            .count(),
        _ => lines
            .filter(|line| line.starts_with("ATOM") || line.starts_with("HETATM"))
            .count(),
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Event(ReviewEvent),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if let Some(folder) = line.strip_prefix("open ") {
        return Some(Command::Event(ReviewEvent::Intent(Intent::SubmitFolder(
            folder.trim().to_string(),
        ))));
    }

    let key = match line {
        "" => return None,
        "quit" | "exit" => return Some(Command::Quit),
        "help" | "?" => return Some(Command::Help),
        "browse" => return Some(Command::Event(ReviewEvent::Intent(Intent::BrowseFolder))),
        "resize" => return Some(Command::Event(ReviewEvent::SurfaceResized)),
        "right" => Key::ArrowRight,
        "left" => Key::ArrowLeft,
        "up" => Key::ArrowUp,
        "down" => Key::ArrowDown,
        "enter" => Key::Enter,
        "backspace" => Key::Backspace,
        single => {
            let mut chars = single.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return None,
            }
        }
    };
    Some(Command::Event(ReviewEvent::Key {
        key,
        focus: Focus::Document,
    }))
}

pub fn render_view(view: &ReviewView) -> String {
    let mut out = String::new();
    if !view.status.is_empty() {
        let marker = if view.last_error.is_some() { "!" } else { "-" };
        out.push_str(&format!("{marker} {}\n", view.status));
    }
    if view.viewer_visible {
        out.push_str(&format!("[{}] {}", view.progress, view.file_name));
        if !view.banner.is_empty() {
            out.push_str(&format!("  ({})", view.banner));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "  accept/decline: {}  back: {}  folder: {}",
        on_off(view.controls.decide),
        on_off(view.controls.back),
        on_off(view.controls.folder),
    ));
    out
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
