use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    state_store::{action::Action, ConnectionStatus, EntryForm, Notification, State},
    ui_management::components::{
        input_box::{self, InputBox},
        usage::{widget_usage_to_text, HasUsageInfo, UsageInfo, UsageInfoLine},
        Component, ComponentRender,
    },
};

use super::notifications::render_notification;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    RoomId,
    Username,
}

struct Props {
    entry: EntryForm,
    connection_status: ConnectionStatus,
    latest_notification: Option<Notification>,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            entry: state.entry.clone(),
            connection_status: state.connection_status.clone(),
            latest_notification: state.notifications.iter().next().cloned(),
        }
    }
}

/// EntryPage asks for the room id and the username to join with
pub struct EntryPage {
    action_tx: UnboundedSender<Action>,
    props: Props,
    focused: Field,
    room_id_input: InputBox,
    username_input: InputBox,
}

impl EntryPage {
    fn focused_input_mut(&mut self) -> &mut InputBox {
        match self.focused {
            Field::RoomId => &mut self.room_id_input,
            Field::Username => &mut self.username_input,
        }
    }

    fn toggle_focus(&mut self) {
        self.focused = match self.focused {
            Field::RoomId => Field::Username,
            Field::Username => Field::RoomId,
        };
    }

    fn submit(&mut self) {
        let _ = self.action_tx.send(Action::SubmitEntry {
            room_id: String::from(self.room_id_input.text()),
            username: String::from(self.username_input.text()),
        });
    }

    fn border_color(&self, field: Field) -> Color {
        if self.focused == field {
            Color::Yellow
        } else {
            Color::Reset
        }
    }
}

impl Component for EntryPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        let mut room_id_input = InputBox::default();
        room_id_input.set_text(&state.entry.room_id);
        let mut username_input = InputBox::default();
        username_input.set_text(&state.entry.username);

        EntryPage {
            action_tx,
            props: Props::from(state),
            focused: Field::RoomId,
            room_id_input,
            username_input,
        }
    }

    fn move_with_state(mut self, state: &State) -> Self
    where
        Self: Sized,
    {
        // the store overwrites the form when it generates a room id or a room is left
        if state.entry.revision != self.props.entry.revision {
            self.room_id_input.set_text(&state.entry.room_id);
            if self.username_input.text().is_empty() {
                self.username_input.set_text(&state.entry.username);
            }
        }

        EntryPage {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Entry Page"
    }

    fn on_key_press(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => {
                    let _ = self.action_tx.send(Action::GenerateRoomId);
                }
                KeyCode::Char('c') => {
                    let _ = self.action_tx.send(Action::Exit);
                }
                _ => (),
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_focus(),
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                let _ = self.action_tx.send(Action::Exit);
            }
            _ => {
                self.focused_input_mut().handle_key_event(key);
            }
        }
    }
}

impl ComponentRender<()> for EntryPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [_, vertical_centered, container_notification] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Ratio(1, 4),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ]
                .as_ref(),
            )
            .split(frame.size())
        else {
            panic!("The main layout should have 3 chunks")
        };

        let [_, both_centered, _] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                [
                    Constraint::Ratio(1, 4),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 4),
                ]
                .as_ref(),
            )
            .split(vertical_centered)
        else {
            panic!("The horizontal layout should have 3 chunks")
        };

        let [container_title, container_room_id, container_username, container_status, container_usage] =
            *Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(2),
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Length(2),
                        Constraint::Min(1),
                    ]
                    .as_ref(),
                )
                .split(both_centered)
        else {
            panic!("The form layout should have 5 chunks")
        };

        let title = Paragraph::new("Join a code room".bold());
        frame.render_widget(title, container_title);

        self.room_id_input.render(
            frame,
            input_box::RenderProps {
                title: "ROOM ID".into(),
                area: container_room_id,
                border_color: self.border_color(Field::RoomId),
                show_cursor: self.focused == Field::RoomId,
            },
        );
        self.username_input.render(
            frame,
            input_box::RenderProps {
                title: "USERNAME".into(),
                area: container_username,
                border_color: self.border_color(Field::Username),
                show_cursor: self.focused == Field::Username,
            },
        );

        let status = match &self.props.connection_status {
            ConnectionStatus::Connecting => "Connecting...".italic(),
            ConnectionStatus::Errored { err } if !err.is_empty() => {
                Span::from(format!("Last connection failed: {}", err)).red()
            }
            _ => Span::raw(""),
        };
        frame.render_widget(Paragraph::new(status), container_status);

        let usage = Paragraph::new(widget_usage_to_text(self.usage_info())).wrap(Wrap { trim: true });
        frame.render_widget(usage, container_usage);

        if let Some(notification) = self.props.latest_notification.as_ref() {
            render_notification(frame, notification, container_notification);
        }
    }
}

impl HasUsageInfo for EntryPage {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: None,
            lines: vec![
                UsageInfoLine::new(&["Tab"], "to switch fields"),
                UsageInfoLine::new(&["Enter"], "to join the room"),
                UsageInfoLine::new(&["Ctrl-N"], "to create a new room id"),
                UsageInfoLine::new(&["Esc", "Ctrl-C"], "to exit"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;

    fn page() -> (EntryPage, UnboundedReceiver<Action>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let state = State::new(EntryForm {
            room_id: String::from("abc"),
            username: String::new(),
            revision: 0,
        });

        (EntryPage::new(&state, action_tx), action_rx)
    }

    fn type_text(page: &mut EntryPage, text: &str) {
        for c in text.chars() {
            page.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn submits_both_fields() {
        let (mut page, mut action_rx) = page();

        page.handle_key_event(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        type_text(&mut page, "ada");
        page.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        match action_rx.try_recv() {
            Ok(Action::SubmitEntry { room_id, username }) => {
                assert_eq!(room_id, "abc");
                assert_eq!(username, "ada");
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn ctrl_n_asks_for_a_room_id_and_takes_the_generated_one() {
        let (mut page, mut action_rx) = page();

        page.handle_key_event(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert!(matches!(action_rx.try_recv(), Ok(Action::GenerateRoomId)));
        assert_eq!(page.room_id_input.text(), "abc");

        let state = State::new(EntryForm {
            room_id: String::from("V1StGXR8_Z5jdHi6B-myT"),
            username: String::new(),
            revision: 1,
        });
        let page = page.move_with_state(&state);
        assert_eq!(page.room_id_input.text(), "V1StGXR8_Z5jdHi6B-myT");
    }

    #[test]
    fn republished_state_keeps_what_was_typed() {
        let (mut page, _action_rx) = page();
        type_text(&mut page, "def");

        let state = State::new(EntryForm {
            room_id: String::from("abc"),
            username: String::new(),
            revision: 0,
        });
        let page = page.move_with_state(&state);
        assert_eq!(page.room_id_input.text(), "abcdef");
    }
}
