use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use comms::event::Participant;

use crate::{
    state_store::{action::Action, Notification, SpeechStatus, State},
    ui_management::components::{
        code_editor::{self, CodeEditor},
        usage::{widget_usage_to_text, HasUsageInfo, UsageInfo, UsageInfoLine},
        Component, ComponentRender,
    },
};

use super::notifications::render_notification_list;

struct Props {
    room_id: String,
    username: String,
    socket_id: Option<String>,
    clients: Vec<Participant>,
    speech: SpeechStatus,
    /// Newest first
    notifications: Vec<Notification>,
    timer: usize,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            room_id: state.room_id().map(String::from).unwrap_or_default(),
            username: state.username().map(String::from).unwrap_or_default(),
            socket_id: state.socket_id.clone(),
            clients: state.clients.clone(),
            speech: state.speech,
            notifications: state.notifications.iter().cloned().collect(),
            timer: state.timer,
        }
    }
}

/// EditorPage is the room itself: roster and controls on the left, the shared
/// document in the middle, notifications on the right
pub struct EditorPage {
    action_tx: UnboundedSender<Action>,
    props: Props,
    /// Whether key presses go to the editor
    editing: bool,
    code_editor: CodeEditor,
}

impl EditorPage {
    fn send(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }

    fn speech_control(&self) -> Line<'static> {
        let (label, color) = match self.props.speech {
            SpeechStatus::Listening => ("Stop speech", Color::Green),
            SpeechStatus::Idle => ("Start speech", Color::Blue),
            SpeechStatus::Unavailable => ("Speech unavailable", Color::DarkGray),
        };

        Line::from(vec![
            Span::from("(s) ").bold(),
            Span::styled(label, Style::default().fg(color)),
        ])
    }
}

impl Component for EditorPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        EditorPage {
            action_tx: action_tx.clone(),
            props: Props::from(state),
            editing: false,
            code_editor: CodeEditor::new(state, action_tx),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        EditorPage {
            props: Props::from(state),
            code_editor: self.code_editor.move_with_state(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Editor Page"
    }

    fn on_key_press(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.send(Action::Exit);
            return;
        }

        if self.editing {
            if key.code == KeyCode::Esc {
                self.editing = false;
            } else {
                self.code_editor.handle_key_event(key);
            }
            return;
        }

        match key.code {
            KeyCode::Char('e') | KeyCode::Enter => self.editing = true,
            KeyCode::Char('c') => self.send(Action::CopyRoomId),
            KeyCode::Char('l') => self.send(Action::Leave),
            KeyCode::Char('s') => self.send(Action::ToggleSpeech),
            KeyCode::Char('q') => self.send(Action::Exit),
            _ => (),
        }
    }
}

impl ComponentRender<()> for EditorPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [left, middle, right] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                [
                    Constraint::Percentage(20),
                    Constraint::Percentage(55),
                    Constraint::Percentage(25),
                ]
                .as_ref(),
            )
            .split(frame.size())
        else {
            panic!("The main layout should have 3 chunks")
        };

        let [container_room_info, container_clients, container_controls] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(5),
                    Constraint::Min(1),
                    Constraint::Length(6),
                ]
                .as_ref(),
            )
            .split(left)
        else {
            panic!("The left layout should have 3 chunks")
        };

        let room_info = Paragraph::new(Text::from(vec![
            Line::from(vec!["Room: ".into(), Span::from(self.props.room_id.clone()).bold()]),
            Line::from(format!("User: @{}", self.props.username)),
            Line::from(format!("In room for: {} secs", self.props.timer)),
        ]))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Room"));
        frame.render_widget(room_info, container_room_info);

        let clients: Vec<ListItem> = self
            .props
            .clients
            .iter()
            .map(|client| {
                let is_me = self.props.socket_id.as_deref() == Some(client.socket_id.as_str());
                let line = if is_me {
                    Line::from(Span::from(format!("@{} (you)", client.username)).bold())
                } else {
                    Line::from(format!("@{}", client.username))
                };

                ListItem::new(line)
            })
            .collect();
        let clients = List::new(clients).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Connected ({})", self.props.clients.len())),
        );
        frame.render_widget(clients, container_clients);

        let controls = Paragraph::new(Text::from(vec![
            Line::from(vec![Span::from("(c) ").bold(), "Copy ROOM ID".into()]),
            Line::from(vec![Span::from("(l) ").bold(), "Leave".into()]),
            self.speech_control(),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Controls"));
        frame.render_widget(controls, container_controls);

        self.code_editor.render(
            frame,
            code_editor::RenderProps {
                area: middle,
                border_color: if self.editing {
                    Color::Yellow
                } else {
                    Color::Blue
                },
                show_cursor: self.editing,
            },
        );

        let [container_notifications, container_usage] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(10)].as_ref())
            .split(right)
        else {
            panic!("The right layout should have 2 chunks")
        };

        render_notification_list(frame, &self.props.notifications, container_notifications);

        let usage = Paragraph::new(widget_usage_to_text(self.usage_info()))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Usage"));
        frame.render_widget(usage, container_usage);
    }
}

impl HasUsageInfo for EditorPage {
    fn usage_info(&self) -> UsageInfo {
        if self.editing {
            UsageInfo {
                description: Some("Type to edit the shared code".into()),
                lines: vec![
                    UsageInfoLine::new(&["Esc"], "to stop editing"),
                    UsageInfoLine::new(&["↑", "↓", "←", "→"], "to move the cursor"),
                ],
            }
        } else {
            UsageInfo {
                description: None,
                lines: vec![
                    UsageInfoLine::new(&["e"], format!("to activate {}", self.code_editor.name())),
                    UsageInfoLine::new(&["c"], "to copy the room id"),
                    UsageInfoLine::new(&["s"], "to toggle speech input"),
                    UsageInfoLine::new(&["l"], "to leave the room"),
                    UsageInfoLine::new(&["q"], "to exit"),
                ],
            }
        }
    }
}
