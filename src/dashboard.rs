//! Text rendering of the signed-in dashboard.

use crate::stats::{LoadPhase, StatKind, StoreState};

/// Time-of-day greeting for a local hour (0-23).
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 18 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}

/// Profile name if set, otherwise the local part of the email.
pub fn display_name(profile_name: Option<&str>, email: &str) -> String {
    match profile_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => email.split('@').next().unwrap_or(email).to_string(),
    }
}

fn status_line(state: &StoreState) -> Option<&'static str> {
    if state.is_loading {
        return Some("Loading your stats...");
    }
    if !state.is_online {
        return Some("Offline: showing your last known stats");
    }
    match state.phase {
        LoadPhase::Degraded => Some("Stats could not be refreshed; showing last known values"),
        _ => None,
    }
}

/// Renders the greeting, a status line when degraded, and one row per counter.
pub fn render(name: &str, hour: u32, state: &StoreState) -> String {
    let mut lines = vec![format!("{}, {}!", greeting(hour), name)];
    if let Some(status) = status_line(state) {
        lines.push(status.to_string());
    }
    lines.push(String::new());

    let width = StatKind::ALL
        .iter()
        .map(|kind| kind.label().len())
        .max()
        .unwrap_or(0);
    for kind in StatKind::ALL {
        lines.push(format!(
            "  {:<width$}  {}",
            kind.label(),
            state.stats.get(kind),
            width = width
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
