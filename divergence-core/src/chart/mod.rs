//! Dual-axis chart model, HTML output, and viewer launch.

pub mod figure;
pub mod html;

pub use figure::{build_figure, correlation_text, Figure};
pub use html::{render_html, write_html};

use std::path::Path;
use std::process::Command;

/// Open `path` with the platform's default handler. Does not wait for the viewer.
pub fn open_in_viewer(path: &Path) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    command.arg(path).spawn().map(|_| ())
}
