use chrono::{DateTime, Local};
use std::fmt::Write;

use crate::api::models::{Direction, Message};
use crate::view::controller::ViewController;

const WIDTH: usize = 60;

pub struct ChatView;

impl ChatView {
    pub fn render(view: &ViewController) -> String {
        let Some(contact) = view.selected_contact() else {
            return "Select a contact to start chatting\n".to_string();
        };
        let mut out = String::new();
        let _ = writeln!(out, "[{}] {}  {}", contact.avatar, contact.name, contact.phone);
        out.push_str(&"-".repeat(WIDTH));
        out.push('\n');

        if view.is_loading_messages() {
            out.push_str("Loading messages…\n");
        } else {
            for message in view.messages() {
                out.push_str(&bubble(message));
                out.push('\n');
            }
        }
        out.push_str(&"-".repeat(WIDTH));
        out.push('\n');
        if view.is_sending() {
            out.push_str("Sending…\n");
        } else {
            out.push_str("Type a message...\n");
        }
        out
    }
}

fn bubble(message: &Message) -> String {
    let line = format!("{} ({})", message.text, clock_time(&message.timestamp));
    match message.direction {
        Direction::Incoming => line,
        Direction::Outgoing => format!("{line:>width$}", width = WIDTH),
    }
}

/// `HH:MM` in local time, or the raw value if it is not RFC 3339.
fn clock_time(ts: &str) -> String {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.with_timezone(&Local).format("%H:%M").to_string(),
        Err(_) => ts.to_string(),
    }
}
