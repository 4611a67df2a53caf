//! OS-backed controller driving an X11 desktop through `xdotool`/`wmctrl`.
//!
//! The subprocess boundary is the opaque capability call: this module never
//! interprets window-manager state beyond parsing `wmctrl -l` output. Every
//! child process runs under a hard timeout so a wedged display server
//! surfaces as a failed action instead of a hung invocation.

use serde_json::json;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::{ActionResult, Controller, MouseButton, ScrollDirection};

/// Upper bound for any single automation subprocess. The dispatcher's
/// action timeout must stay above this so an abandoned blocking task has
/// already killed its child before the controller gate is released.
pub(crate) const SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between simulated keystrokes, in milliseconds. Matches what most
/// toolkits need to not drop characters.
const TYPE_DELAY_MS: u32 = 12;

pub struct NativeController;

impl NativeController {
    pub fn new() -> Self {
        Self
    }

    /// Run a command to completion under [`SUBPROCESS_TIMEOUT`], folding
    /// every failure mode (spawn error, non-zero exit, timeout) into a
    /// printable error message.
    fn run(&self, program: &str, args: &[&str]) -> Result<String, String> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start {program}: {e}"))?;

        let deadline = Instant::now() + SUBPROCESS_TIMEOUT;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let output = child
                        .wait_with_output()
                        .map_err(|e| format!("failed to collect {program} output: {e}"))?;
                    if status.success() {
                        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
                    }
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(format!(
                        "{program} exited with {status}: {}",
                        stderr.trim()
                    ));
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(format!(
                            "{program} did not finish within {}s",
                            SUBPROCESS_TIMEOUT.as_secs()
                        ));
                    }
                    std::thread::sleep(Duration::from_millis(25));
                }
                Err(e) => return Err(format!("failed to poll {program}: {e}")),
            }
        }
    }

    fn xdotool(&self, args: &[&str]) -> Result<String, String> {
        self.run("xdotool", args)
    }

    /// Enumerate windows via `wmctrl -l`.
    fn windows(&self) -> Result<Vec<(String, String)>, String> {
        let listing = self.run("wmctrl", &["-l"])?;
        Ok(listing.lines().filter_map(parse_window_line).collect())
    }
}

/// Parse one `wmctrl -l` line: `<id> <desktop> <host> <title...>`.
///
/// The desktop column is printed right-aligned (`%2ld`), so single-digit
/// desktops leave a double space after the window id and sticky windows
/// show `-1`. Columns are therefore split on runs of whitespace, not on
/// single separators; only the remainder after the third column is title.
fn parse_window_line(line: &str) -> Option<(String, String)> {
    let mut remainder = line;
    let mut id = String::new();
    for column in 0..3 {
        let trimmed = remainder.trim_start();
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let (field, rest) = trimmed.split_at(end);
        if field.is_empty() {
            return None;
        }
        if column == 0 {
            id = field.to_string();
        }
        remainder = rest;
    }
    Some((id, remainder.trim().to_string()))
}

impl Default for NativeController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for NativeController {
    fn click(&self, x: i64, y: i64, button: MouseButton) -> ActionResult {
        let button_code = match button {
            MouseButton::Left => "1",
            MouseButton::Middle => "2",
            MouseButton::Right => "3",
        };
        let x = x.to_string();
        let y = y.to_string();
        match self.xdotool(&["mousemove", &x, &y, "click", button_code]) {
            Ok(_) => ActionResult::ok(format!(
                "clicked at ({x}, {y}) with {} button",
                button.as_str()
            )),
            Err(e) => ActionResult::failed(e),
        }
    }

    fn type_text(&self, text: &str, press_enter: bool) -> ActionResult {
        let delay = TYPE_DELAY_MS.to_string();
        if let Err(e) = self.xdotool(&["type", "--delay", &delay, "--", text]) {
            return ActionResult::failed(e);
        }
        if press_enter {
            if let Err(e) = self.xdotool(&["key", "Return"]) {
                return ActionResult::failed(e);
            }
        }
        let suffix = if press_enter { ", then pressed Enter" } else { "" };
        ActionResult::ok(format!("typed {} characters{suffix}", text.chars().count()))
    }

    fn scroll(&self, amount: i64, direction: ScrollDirection) -> ActionResult {
        if amount == 0 {
            return ActionResult::ok(format!(
                "scroll {} by 0 requested, nothing to do",
                direction.as_str()
            ));
        }
        // Wheel events: 4/5 = up/down, 6/7 = left/right. One click per
        // ~100 units of requested distance, at least one.
        let button = match (direction, amount >= 0) {
            (ScrollDirection::Vertical, true) => "5",
            (ScrollDirection::Vertical, false) => "4",
            (ScrollDirection::Horizontal, true) => "7",
            (ScrollDirection::Horizontal, false) => "6",
        };
        let clicks = (amount.unsigned_abs() / 100).max(1).min(50).to_string();
        match self.xdotool(&["click", "--repeat", &clicks, button]) {
            Ok(_) => ActionResult::ok(format!(
                "scrolled {} by {amount}",
                direction.as_str()
            )),
            Err(e) => ActionResult::failed(e),
        }
    }

    fn list_windows(&self) -> ActionResult {
        match self.windows() {
            Ok(windows) => {
                let entries: Vec<_> = windows
                    .iter()
                    .map(|(id, title)| json!({ "id": id, "title": title }))
                    .collect();
                ActionResult::ok_with_data(
                    format!("{} windows open", entries.len()),
                    json!({ "windows": entries }),
                )
            }
            Err(e) => ActionResult::failed(e),
        }
    }

    fn focus_window(&self, title: &str) -> ActionResult {
        let needle = title.to_lowercase();
        let windows = match self.windows() {
            Ok(windows) => windows,
            Err(e) => return ActionResult::failed(e),
        };
        let Some((id, matched)) = windows
            .into_iter()
            .find(|(_, t)| t.to_lowercase().contains(&needle))
        else {
            return ActionResult::failed(format!("no window matching '{title}'"));
        };
        match self.run("wmctrl", &["-i", "-a", &id]) {
            Ok(_) => ActionResult::ok(format!("focused window '{matched}'")),
            Err(e) => ActionResult::failed(e),
        }
    }

    fn launch_app(&self, target: &str) -> ActionResult {
        let mut parts = target.split_whitespace();
        let Some(program) = parts.next() else {
            return ActionResult::failed("launch target is empty");
        };
        // Spawn detached; the caller polls `list_windows` to confirm the
        // application actually came up.
        match Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => ActionResult::ok_with_data(
                format!("launched '{program}'"),
                json!({ "pid": child.id() }),
            ),
            Err(e) => ActionResult::failed(format!("failed to launch '{program}': {e}")),
        }
    }

    fn backend(&self) -> &'static str {
        "native"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_single_digit_desktop() {
        // %2ld padding puts a double space after the id on desktops 0-9.
        let parsed = parse_window_line("0x03a00002  0 host Terminal - bash");
        assert_eq!(
            parsed,
            Some(("0x03a00002".to_string(), "Terminal - bash".to_string()))
        );
    }

    #[test]
    fn parses_sticky_desktop() {
        let parsed = parse_window_line("0x04c00003 -1 host Desktop");
        assert_eq!(
            parsed,
            Some(("0x04c00003".to_string(), "Desktop".to_string()))
        );
    }

    #[test]
    fn parses_double_digit_desktop_and_spaced_title() {
        let parsed = parse_window_line("0x05000004 12 host  My  Editor ");
        assert_eq!(
            parsed,
            Some(("0x05000004".to_string(), "My  Editor".to_string()))
        );
    }

    #[test]
    fn skips_blank_and_truncated_lines() {
        assert_eq!(parse_window_line(""), None);
        assert_eq!(parse_window_line("   "), None);
        assert_eq!(parse_window_line("0x03a00002  0"), None);
    }

    #[test]
    fn untitled_window_yields_empty_title() {
        let parsed = parse_window_line("0x03a00002  0 host");
        assert_eq!(parsed, Some(("0x03a00002".to_string(), String::new())));
    }

    #[test]
    fn zero_distance_scroll_is_a_no_op() {
        // Must not spawn any wheel-click subprocess.
        let controller = NativeController::new();
        let result = controller.scroll(0, ScrollDirection::Vertical);
        assert!(result.success);
        assert!(result.message.contains("by 0"));
    }
}
