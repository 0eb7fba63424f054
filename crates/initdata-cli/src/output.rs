//! Output formatting utilities.

use chrono::{TimeZone, Utc};
use initdata_core::ValidationOutcome;

/// Renders a validation outcome as plain text.
pub fn format_outcome(outcome: &ValidationOutcome) -> String {
    let mut out = String::new();
    match outcome {
        ValidationOutcome::Valid { profile, issued_at } => {
            out.push_str("VALID\n");
            out.push_str(&format!("{:<12} {}\n", "USER_ID", profile.id));
            let name = match &profile.last_name {
                Some(last) => format!("{} {}", profile.first_name, last),
                None => profile.first_name.clone(),
            };
            out.push_str(&format!("{:<12} {}\n", "NAME", name));
            if let Some(username) = &profile.username {
                out.push_str(&format!("{:<12} @{}\n", "USERNAME", username));
            }
            out.push_str(&format!("{:<12} {}\n", "AUTH_DATE", format_timestamp(*issued_at)));
        }
        ValidationOutcome::Invalid {
            reason,
            diagnostics,
        } => {
            out.push_str(&format!("INVALID ({})\n", reason.code()));
            out.push_str(&format!("{:<12} {}\n", "ERROR", reason));
            out.push_str(&format!("{:<12} {}\n", "CREDENTIAL", diagnostics.credential_id));
            out.push_str(&format!(
                "{:<12} {}\n",
                "FIELDS",
                diagnostics.parsed_fields.join(",")
            ));
            if let Some(canonical) = &diagnostics.canonical_string {
                out.push_str("DATA_CHECK_STRING\n");
                for line in canonical.lines() {
                    out.push_str(&format!("  {}\n", truncate(line, 100)));
                }
            }
            if let Some(age) = diagnostics.age_secs {
                out.push_str(&format!("{:<12} {}s\n", "AGE", age));
            }
        }
    }
    out
}

fn format_timestamp(secs: i64) -> String {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
