//! Formatting helpers shared by the report and the terminal summary.

/// Longest label shown before truncation.
const MAX_LABEL_CHARS: usize = 25;

/// Compact token count: `1.23M`, `45.6K`, or the plain number.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Full token count with thousands separators: `1,234,567`.
pub fn format_number_full(n: u64) -> String {
    let digits = n.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format duration in human-readable form.
pub fn format_duration(secs: i64) -> String {
    if secs < 60 {
        format!("{}s", secs.max(0))
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}h", hours)
        }
    } else {
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}d", days)
        }
    }
}

/// Format duration in milliseconds for display.
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        "<1s".to_string()
    } else {
        format_duration((ms / 1000) as i64)
    }
}

/// Human-friendly model name: `claude-3-5-sonnet` → `Claude 3 5 Sonnet`.
pub fn display_model_name(model: &str) -> String {
    let spaced = model.replace("claude-", "Claude ").replace('-', " ");
    truncate_label(&title_case(&spaced))
}

/// Cut labels longer than 25 characters down to 22 plus `...`.
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
