use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::models::StatusFilter;
use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;
use crate::view::controller::{Layout, ViewController};
use crate::view::events::NotificationKind;

const HELP: &str = "\
/open <n>        open the n-th contact in the list
/back            return to the contact list
/search [text]   filter contacts by name or phone
/filter <status> all | active | inactive
/refresh         reload contacts and the open conversation
/quit            exit
anything else is sent to the open conversation";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Send(String),
    Open(usize),
    Back,
    Search(String),
    Filter(StatusFilter),
    Refresh,
    Help,
    Quit,
    Invalid(String),
    Empty,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Send(line.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "open" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Command::Open(n),
            _ => Command::Invalid(format!("usage: /open <n>, got `{arg}`")),
        },
        "back" => Command::Back,
        "search" => Command::Search(arg.to_string()),
        "filter" => match arg.parse::<StatusFilter>() {
            Ok(filter) => Command::Filter(filter),
            Err(e) => Command::Invalid(e),
        },
        "refresh" => Command::Refresh,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command /{other}, try /help")),
    }
}

/// Applies one command. Returns text to show below the next frame.
fn apply(view: &mut ViewController, command: Command) -> Option<String> {
    match command {
        Command::Send(text) => {
            if view.selected_id().is_none() {
                Some("Open a contact first.".to_string())
            } else if !view.send_message(&text) {
                Some("Still sending the previous message.".to_string())
            } else {
                None
            }
        }
        Command::Open(n) => {
            let id = view.visible_contacts().get(n - 1).map(|c| c.id.clone());
            match id {
                Some(id) => {
                    view.select_contact(&id);
                    None
                }
                None => Some(format!("No contact #{n} in the list.")),
            }
        }
        Command::Back => {
            view.clear_selection();
            None
        }
        Command::Search(text) => {
            view.set_search(&text);
            None
        }
        Command::Filter(filter) => {
            view.set_status_filter(filter);
            None
        }
        Command::Refresh => {
            view.refresh();
            None
        }
        Command::Help => Some(HELP.to_string()),
        Command::Invalid(msg) => Some(msg),
        Command::Quit | Command::Empty => None,
    }
}

/// One full screen of output for the current state.
fn render_frame(view: &ViewController, sidebar: &Sidebar) -> String {
    if let Some(err) = view.contacts_error() {
        return format!("{err}\nType /refresh to try again or /quit to exit.\n");
    }
    match view.layout() {
        Layout::Compact if view.selected_id().is_some() => ChatView::render(view),
        Layout::Compact => sidebar.render(view),
        Layout::Wide => format!("{}\n{}", sidebar.render(view), ChatView::render(view)),
    }
}

fn present(view: &mut ViewController, sidebar: &Sidebar, extra: Option<String>) {
    println!("\n{}", render_frame(view, sidebar));
    for note in view.take_notifications() {
        match note.kind {
            NotificationKind::Info => println!("* {}", note.text),
            NotificationKind::Error => println!("! {}", note.text),
        }
    }
    if let Some(extra) = extra {
        println!("{extra}");
    }
}

pub async fn show_main_window(view: &mut ViewController) -> std::io::Result<()> {
    let sidebar = Sidebar::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    view.load_contacts();
    present(view, &sidebar, Some("Type /help for commands.".to_string()));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = parse_command(&line);
                if command == Command::Quit {
                    if view.is_sending() {
                        println!("Waiting for the last message to go out…");
                        view.settle().await;
                        present(view, &sidebar, None);
                    }
                    break;
                }
                debug!("command: {command:?}");
                let extra = apply(view, command);
                present(view, &sidebar, extra);
            }
            Some(event) = view.recv_event() => {
                view.handle_event(event);
                present(view, &sidebar, None);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ApiClient;
    use crate::app::Config;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn loaded_view(server: &MockServer, layout: Layout) -> ViewController {
        Mock::given(method("GET"))
            .and(path("/v0/appBase/tblContacts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": [
                {"id": "recA", "fields": {
                    "Name": "Amy Pond", "Phone": "555-0001", "Status": "Active",
                    "Last Message": "see you", "Last Contact Time": "2024-03-02T00:00:00.000Z"}},
                {"id": "recB", "fields": {
                    "Name": "Bob Stone", "Phone": "555-0002", "Status": "Inactive"}},
            ]})))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v0/appBase/tblMessages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": [
                {"id": "m1", "fields": {"Message Text": "hi there", "Direction": "Incoming",
                    "Timestamp": "2024-03-02T00:00:00.000Z", "Contact": ["recA"]}},
            ]})))
            .mount(server)
            .await;
        let config = Config {
            api_key: "keyTest".into(),
            base_id: "appBase".into(),
            contacts_table_id: "tblContacts".into(),
            messages_table_id: "tblMessages".into(),
            api_url: format!("{}/v0", server.uri()),
            ..Config::default()
        };
        let mut view = ViewController::new(ApiClient::new(&config).unwrap(), layout);
        view.load_contacts();
        view.settle().await;
        view
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  hello  "), Command::Send("hello".into()));
        assert_eq!(parse_command("/open 2"), Command::Open(2));
        assert!(matches!(parse_command("/open 0"), Command::Invalid(_)));
        assert_eq!(parse_command("/search  bob "), Command::Search("bob".into()));
        assert_eq!(parse_command("/search"), Command::Search(String::new()));
        assert_eq!(parse_command("/filter Inactive"), Command::Filter(StatusFilter::Inactive));
        assert!(matches!(parse_command("/filter archived"), Command::Invalid(_)));
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command(""), Command::Empty);
        assert!(matches!(parse_command("/dance"), Command::Invalid(_)));
    }

    #[tokio::test]
    async fn wide_frame_shows_both_panes() {
        let server = MockServer::start().await;
        let view = loaded_view(&server, Layout::Wide).await;
        let frame = render_frame(&view, &Sidebar::new());
        assert!(frame.contains(">  1. [AP] Amy Pond (Active)"));
        assert!(frame.contains("No messages yet"));
        assert!(frame.contains("[AP] Amy Pond  555-0001"));
        assert!(frame.contains("hi there"));
    }

    #[tokio::test]
    async fn compact_frame_switches_panes() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, Layout::Compact).await;
        let sidebar = Sidebar::new();
        assert!(render_frame(&view, &sidebar).starts_with("Inbox"));

        assert_eq!(apply(&mut view, Command::Open(2)), None);
        view.settle().await;
        assert!(render_frame(&view, &sidebar).starts_with("[BS] Bob Stone"));

        apply(&mut view, Command::Back);
        assert!(render_frame(&view, &sidebar).starts_with("Inbox"));
    }

    #[tokio::test]
    async fn search_with_no_hits_renders_empty_state() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, Layout::Compact).await;
        apply(&mut view, Command::Search("zzz".into()));
        let frame = render_frame(&view, &Sidebar::new());
        assert!(frame.contains("[search: zzz]"));
        assert!(frame.contains("No contacts found."));
        assert_eq!(
            apply(&mut view, Command::Open(1)),
            Some("No contact #1 in the list.".to_string())
        );
    }

    #[tokio::test]
    async fn send_requires_an_open_contact() {
        let server = MockServer::start().await;
        let mut view = loaded_view(&server, Layout::Compact).await;
        assert_eq!(
            apply(&mut view, Command::Send("hi".into())),
            Some("Open a contact first.".to_string())
        );
    }

    #[tokio::test]
    async fn contacts_error_takes_the_whole_screen() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let config = Config {
            api_key: "keyTest".into(),
            base_id: "appBase".into(),
            contacts_table_id: "tblContacts".into(),
            messages_table_id: "tblMessages".into(),
            api_url: format!("{}/v0", server.uri()),
            ..Config::default()
        };
        let mut view = ViewController::new(ApiClient::new(&config).unwrap(), Layout::Wide);
        view.load_contacts();
        view.settle().await;
        let frame = render_frame(&view, &Sidebar::new());
        assert!(frame.starts_with("Failed to fetch contacts from Airtable."));
        assert!(!frame.contains("Inbox"));
    }
}
