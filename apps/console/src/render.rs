//! Text rendering of alerts and the user table.
//!
//! User-supplied text is written as inert characters only. Control characters
//! (which would let a stored name emit terminal escape sequences) and bidi
//! overrides are replaced before anything reaches the terminal.

use entities::{Alert, UserRecord};

/// Returns `text` with control and bidi-override characters replaced.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() || is_bidi_control(c) {
                char::REPLACEMENT_CHARACTER
            } else {
                c
            }
        })
        .collect()
}

fn is_bidi_control(c: char) -> bool {
    matches!(c, '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

/// Status label derived from the active flag.
pub fn status_label(active: bool) -> &'static str {
    if active {
        "ATIVO"
    } else {
        "INATIVO"
    }
}

/// Label of the action that flips the active flag.
pub fn toggle_label(active: bool) -> &'static str {
    if active {
        "Inativar"
    } else {
        "Ativar"
    }
}

/// Renders an alert as `[severity] message`.
pub fn render_alert(alert: &Alert) -> String {
    format!("[{}] {}", alert.severity, sanitize_text(&alert.message))
}

/// Renders the user table.
pub fn render_table(users: &[UserRecord]) -> String {
    if users.is_empty() {
        return "(nenhum usuário)".to_string();
    }

    let header = ["ID", "Nome", "E-mail", "Perfil", "Status", "Ação"];
    let rows: Vec<[String; 6]> = users
        .iter()
        .map(|u| {
            [
                sanitize_text(&u.id),
                sanitize_text(&u.name),
                sanitize_text(&u.email),
                u.profile.to_string(),
                status_label(u.active).to_string(),
                toggle_label(u.active).to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| pad(cell, width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = vec![format_row(header.as_slice()), separator];
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines.join("\n")
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{cell}{}", " ".repeat(width.saturating_sub(len)))
}
