use std::fmt::Write;

use crate::view::controller::ViewController;

/// Text rendering of the contact list pane.
pub struct Sidebar {
    title: String,
    width: usize,
}

impl Sidebar {
    pub fn new() -> Self {
        Self {
            title: "Inbox".to_string(),
            width: 40,
        }
    }

    pub fn render(&self, view: &ViewController) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}  [filter: {}]", self.title, view.status_filter());
        if !view.search().is_empty() {
            let _ = write!(out, " [search: {}]", view.search());
        }
        out.push('\n');
        out.push_str(&"-".repeat(self.width));
        out.push('\n');

        if view.is_loading_contacts() {
            out.push_str("Loading contacts…\n");
            return out;
        }
        let items = view.visible_contacts();
        if items.is_empty() {
            out.push_str("No contacts found.\n");
            return out;
        }
        let selected = view.selected_id();
        for (idx, contact) in items.iter().enumerate() {
            let marker = if selected == Some(contact.id.as_str()) { '>' } else { ' ' };
            let _ = writeln!(
                out,
                "{marker}{:>3}. [{}] {} ({})",
                idx + 1,
                contact.avatar,
                contact.name,
                contact.status
            );
            let _ = writeln!(out, "       {}", truncate(&contact.last_message, self.width - 7));
        }
        out
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
