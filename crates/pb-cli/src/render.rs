//! Terminal rendering of directory views

use nu_ansi_term::{Color, Style};
use pb_app::{
    ContactCard, ContactForm, ListBody, ListQuery, ListView, Notification, PageButton,
    PaginationView, Severity, StatisticsView, EMPTY_HINT, EMPTY_TITLE,
};
use std::fmt::Write;

const RULE_WIDTH: usize = 50;
const BAR_WIDTH: usize = 20;

fn rule() -> String {
    Style::new().dimmed().paint("─".repeat(RULE_WIDTH)).to_string()
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "   {} {}", Style::new().dimmed().paint(format!("{:<8}", label)), value);
}

pub fn notification(note: &Notification) -> String {
    let color = match note.severity {
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
        Severity::Info => Color::Blue,
        Severity::Warning => Color::Yellow,
    };
    color
        .paint(format!("{} {}", note.severity.icon(), note.message))
        .to_string()
}

pub fn card(card: &ContactCard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}  {}",
        Style::new().dimmed().paint(format!("#{}", card.id)),
        Style::new().bold().paint(&card.name),
        Color::Purple.paint(format!("[{}]", card.category_label)),
    );
    field(&mut out, "Phone", &card.phone_number);
    if let Some(email) = &card.email {
        field(&mut out, "Email", email);
    }
    if let Some(address) = &card.address {
        field(&mut out, "Address", address);
    }
    if let Some(notes) = &card.notes {
        field(&mut out, "Notes", notes);
    }
    if let Some(created) = &card.created {
        field(&mut out, "Created", created);
    }
    if let Some(updated) = &card.updated {
        field(&mut out, "Updated", updated);
    }
    out
}

pub fn pagination(view: &PaginationView) -> String {
    let mut parts = Vec::with_capacity(view.buttons.len() + 2);

    let prev = if view.has_previous {
        Style::new().paint("‹ Prev")
    } else {
        Style::new().dimmed().paint("‹ Prev")
    };
    parts.push(prev.to_string());

    for button in &view.buttons {
        let text = match button {
            PageButton::Page { current: true, .. } => Color::Cyan
                .bold()
                .paint(format!("[{}]", button.label()))
                .to_string(),
            _ => button.label(),
        };
        parts.push(text);
    }

    let next = if view.has_next {
        Style::new().paint("Next ›")
    } else {
        Style::new().dimmed().paint("Next ›")
    };
    parts.push(next.to_string());

    format!("{}\n{}", parts.join(" "), Style::new().dimmed().paint(view.range_text()))
}

fn filters(query: &ListQuery) -> Option<String> {
    let mut active = Vec::new();
    if let Some(keyword) = query.keyword() {
        active.push(format!("search \"{}\"", keyword));
    }
    if let Some(category) = query.category() {
        let text = format!("category {}", category.label());
        // The server only applies one filter; a keyword wins
        if query.keyword().is_some() {
            active.push(Style::new().dimmed().paint(format!("({} ignored)", text)).to_string());
        } else {
            active.push(text);
        }
    }
    (!active.is_empty()).then(|| format!("Filters: {}", active.join(", ")))
}

pub fn list(view: &ListView, query: &ListQuery) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", Style::new().bold().paint(view.count_line()));
    if let Some(filters) = filters(query) {
        let _ = writeln!(out, "{}", filters);
    }
    let _ = writeln!(out, "{}", rule());

    match &view.body {
        ListBody::Empty => {
            let _ = writeln!(out, "  {}", Style::new().bold().paint(EMPTY_TITLE));
            let _ = writeln!(out, "  {}", Style::new().dimmed().paint(EMPTY_HINT));
        }
        ListBody::Cards(cards) => {
            for (i, c) in cards.iter().enumerate() {
                if i > 0 {
                    let _ = writeln!(out);
                }
                out.push_str(&card(c));
            }
        }
    }

    let _ = writeln!(out, "{}", rule());
    if let Some(pages) = &view.pagination {
        let _ = writeln!(out, "{}", pagination(pages));
    }
    out
}

pub fn statistics(view: &StatisticsView) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", Style::new().bold().paint("Statistics"));
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "  {:<10} {}", "Total", view.total);

    for share in &view.shares {
        let filled = ((share.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled.min(BAR_WIDTH)),
            "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
        );
        let _ = writeln!(
            out,
            "  {:<10} {:>5}  {}  {}%",
            share.label,
            share.count,
            Color::Cyan.paint(bar),
            share.percent_text
        );
    }
    let _ = writeln!(out, "{}", rule());
    out
}

/// Current form values, shown before and after field entry
pub fn form(form: &ContactForm) -> String {
    let f = form.fields();
    let mut out = String::new();
    let _ = writeln!(out, "{}", Style::new().bold().paint(form.title()));
    field(&mut out, "Name", &f.name);
    field(&mut out, "Phone", &f.phone_number);
    field(&mut out, "Email", &f.email);
    field(&mut out, "Address", &f.address);
    field(&mut out, "Category", f.category_label().unwrap_or("-"));
    field(&mut out, "Notes", &f.notes);
    out
}
