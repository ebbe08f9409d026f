//! Lock and unlock message rendering.
//!
//! Messages are shown to the viewer as the termination reason. A ransom may
//! carry its own templates; placeholders are replaced literally:
//!
//! | Placeholder   | Value                              |
//! |---------------|------------------------------------|
//! | `{movie}`     | prerequisite title                 |
//! | `{library}`   | locked collection                  |
//! | `{threshold}` | threshold, truncated to an integer |
//! | `{progress}`  | progress, truncated (unlock only)  |

use crate::ransom::Gate;

/// Default message sent when a locked collection is played.
pub const DEFAULT_LOCK_TEMPLATE: &str =
    "LIBRARY LOCKED! Watch {threshold}% of '{movie}' to unlock '{library}'";

/// Default message sent when the threshold is reached.
pub const DEFAULT_UNLOCK_TEMPLATE: &str =
    "🎉 FREEDOM! You watched {progress}% - '{library}' is now unlocked!";

/// Render the message for a violation.
pub fn render_lock_message(custom: Option<&str>, gate: &Gate<'_>) -> String {
    let template = pick(custom, DEFAULT_LOCK_TEMPLATE);
    substitute(template, gate)
}

/// Render the message for an unlock at `progress`.
pub fn render_unlock_message(custom: Option<&str>, gate: &Gate<'_>, progress: f64) -> String {
    let template = pick(custom, DEFAULT_UNLOCK_TEMPLATE);
    substitute(template, gate).replace("{progress}", &whole(progress).to_string())
}

fn pick<'a>(custom: Option<&'a str>, fallback: &'a str) -> &'a str {
    match custom {
        Some(t) if !t.trim().is_empty() => t,
        _ => fallback,
    }
}

fn substitute(template: &str, gate: &Gate<'_>) -> String {
    template
        .replace("{movie}", gate.prerequisite)
        .replace("{threshold}", &whole(gate.threshold).to_string())
        .replace("{library}", gate.locked_collection)
}

fn whole(percent: f64) -> i64 {
    percent.trunc() as i64
}
