use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::{Backend, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};

use super::{Component, ComponentRender};

const TAB: &str = "    ";

/// Multi line editor for the shared document.
///
/// Every local modification is sent to the store as a whole new document.
/// The text is only replaced from the state when the document revision moves,
/// so a state published in the middle of typing does not undo keystrokes.
pub struct CodeEditor {
    action_tx: UnboundedSender<Action>,
    lines: Vec<String>,
    /// Cursor row and column, the column counts chars
    cursor: (usize, usize),
    synced_revision: usize,
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(String::from).collect()
}

impl CodeEditor {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn current_line(&self) -> &str {
        &self.lines[self.cursor.0]
    }

    fn replace_text(&mut self, text: &str) {
        self.lines = split_lines(text);

        let row = self.cursor.0.min(self.lines.len() - 1);
        let col = self.cursor.1.min(char_len(&self.lines[row]));
        self.cursor = (row, col);
    }

    fn insert_str(&mut self, to_insert: &str) {
        let (row, col) = self.cursor;
        let idx = byte_index(&self.lines[row], col);

        self.lines[row].insert_str(idx, to_insert);
        self.cursor.1 += char_len(to_insert);
    }

    fn insert_newline(&mut self) {
        let (row, col) = self.cursor;
        let idx = byte_index(&self.lines[row], col);

        let rest = self.lines[row].split_off(idx);
        self.lines.insert(row + 1, rest);
        self.cursor = (row + 1, 0);
    }

    fn delete_before_cursor(&mut self) -> bool {
        let (row, col) = self.cursor;

        if col > 0 {
            let idx = byte_index(&self.lines[row], col - 1);
            self.lines[row].remove(idx);
            self.cursor.1 -= 1;
        } else if row > 0 {
            let line = self.lines.remove(row);
            let previous_len = char_len(&self.lines[row - 1]);
            self.lines[row - 1].push_str(&line);
            self.cursor = (row - 1, previous_len);
        } else {
            return false;
        }

        true
    }

    fn delete_at_cursor(&mut self) -> bool {
        let (row, col) = self.cursor;

        if col < char_len(&self.lines[row]) {
            let idx = byte_index(&self.lines[row], col);
            self.lines[row].remove(idx);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        } else {
            return false;
        }

        true
    }

    fn move_left(&mut self) {
        let (row, col) = self.cursor;

        if col > 0 {
            self.cursor.1 -= 1;
        } else if row > 0 {
            self.cursor = (row - 1, char_len(&self.lines[row - 1]));
        }
    }

    fn move_right(&mut self) {
        let (row, col) = self.cursor;

        if col < char_len(self.current_line()) {
            self.cursor.1 += 1;
        } else if row + 1 < self.lines.len() {
            self.cursor = (row + 1, 0);
        }
    }

    fn move_vertically(&mut self, row: usize) {
        let col = self.cursor.1.min(char_len(&self.lines[row]));
        self.cursor = (row, col);
    }

    fn publish(&self) {
        let _ = self.action_tx.send(Action::EditCode { code: self.text() });
    }
}

impl Component for CodeEditor {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        CodeEditor {
            action_tx,
            lines: split_lines(state.code.as_deref().unwrap_or_default()),
            cursor: (0, 0),
            synced_revision: state.code_revision,
        }
    }

    fn move_with_state(mut self, state: &State) -> Self
    where
        Self: Sized,
    {
        if self.synced_revision != state.code_revision {
            self.replace_text(state.code.as_deref().unwrap_or_default());
            self.synced_revision = state.code_revision;
        }

        self
    }

    fn name(&self) -> &str {
        "Code Editor"
    }

    fn on_key_press(&mut self, key: KeyEvent) {
        let modified = match key.code {
            // shortcuts are not text
            KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => false,
            KeyCode::Char(to_insert) => {
                self.insert_str(to_insert.encode_utf8(&mut [0; 4]));
                true
            }
            KeyCode::Tab => {
                self.insert_str(TAB);
                true
            }
            KeyCode::Enter => {
                self.insert_newline();
                true
            }
            KeyCode::Backspace => self.delete_before_cursor(),
            KeyCode::Delete => self.delete_at_cursor(),
            KeyCode::Left => {
                self.move_left();
                false
            }
            KeyCode::Right => {
                self.move_right();
                false
            }
            KeyCode::Up if self.cursor.0 > 0 => {
                self.move_vertically(self.cursor.0 - 1);
                false
            }
            KeyCode::Down if self.cursor.0 + 1 < self.lines.len() => {
                self.move_vertically(self.cursor.0 + 1);
                false
            }
            KeyCode::Home => {
                self.cursor.1 = 0;
                false
            }
            KeyCode::End => {
                self.cursor.1 = char_len(self.current_line());
                false
            }
            _ => false,
        };

        if modified {
            self.publish();
        }
    }
}

pub struct RenderProps {
    pub area: Rect,
    pub border_color: Color,
    pub show_cursor: bool,
}

/// First visible index so that `position` stays inside a window of `size`
fn scroll_offset(position: usize, size: u16) -> usize {
    let size = size as usize;

    if size == 0 {
        position
    } else {
        (position + 1).saturating_sub(size)
    }
}

impl ComponentRender<RenderProps> for CodeEditor {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        // borders take one cell on each side
        let inner_height = props.area.height.saturating_sub(2);
        let inner_width = props.area.width.saturating_sub(2);
        let (row, col) = self.cursor;
        let row_offset = scroll_offset(row, inner_height);
        let col_offset = scroll_offset(col, inner_width);

        let lines: Vec<Line> = self
            .lines
            .iter()
            .skip(row_offset)
            .take(inner_height as usize)
            .map(|line| Line::from(line.chars().skip(col_offset).collect::<String>()))
            .collect();

        let editor = Paragraph::new(lines)
            .style(Style::default().fg(Color::Reset))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .fg(props.border_color)
                    .title(format!("Code ({}:{})", row + 1, col + 1)),
            );
        frame.render_widget(editor, props.area);

        if props.show_cursor {
            frame.set_cursor(
                props.area.x + (col - col_offset) as u16 + 1,
                props.area.y + (row - row_offset) as u16 + 1,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;

    fn editor_with(code: Option<&str>) -> (CodeEditor, UnboundedReceiver<Action>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let state = State {
            code: code.map(String::from),
            ..Default::default()
        };

        (CodeEditor::new(&state, action_tx), action_rx)
    }

    fn press(editor: &mut CodeEditor, code: KeyCode) {
        editor.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn last_edit(action_rx: &mut UnboundedReceiver<Action>) -> Option<String> {
        let mut last = None;
        while let Ok(action) = action_rx.try_recv() {
            if let Action::EditCode { code } = action {
                last = Some(code);
            }
        }
        last
    }

    #[test]
    fn typing_publishes_the_whole_document() {
        let (mut editor, mut action_rx) = editor_with(None);

        for c in "fn main() {".chars() {
            press(&mut editor, KeyCode::Char(c));
        }
        press(&mut editor, KeyCode::Enter);
        press(&mut editor, KeyCode::Tab);
        press(&mut editor, KeyCode::Char('é'));

        assert_eq!(
            last_edit(&mut action_rx).as_deref(),
            Some("fn main() {\n    é")
        );
        assert_eq!(editor.cursor, (1, 5));
    }

    #[test]
    fn control_and_alt_chords_are_not_typed() {
        let (mut editor, mut action_rx) = editor_with(Some("ab"));

        editor.handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        editor.handle_key_event(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        assert_eq!(last_edit(&mut action_rx), None);
        assert_eq!(editor.text(), "ab");

        // shifted letters are still text
        editor.handle_key_event(KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT));
        assert_eq!(last_edit(&mut action_rx).as_deref(), Some("Cab"));
    }

    #[test]
    fn navigation_does_not_publish() {
        let (mut editor, mut action_rx) = editor_with(Some("ab\ncd"));

        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::End);
        press(&mut editor, KeyCode::Right);
        press(&mut editor, KeyCode::Up);
        press(&mut editor, KeyCode::Home);
        press(&mut editor, KeyCode::Left);

        assert_eq!(last_edit(&mut action_rx), None);
        assert_eq!(editor.cursor, (0, 0));
    }

    #[test]
    fn backspace_and_delete_join_lines() {
        let (mut editor, mut action_rx) = editor_with(Some("ab\ncd\nef"));

        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Backspace);
        assert_eq!(last_edit(&mut action_rx).as_deref(), Some("abcd\nef"));
        assert_eq!(editor.cursor, (0, 2));

        press(&mut editor, KeyCode::End);
        press(&mut editor, KeyCode::Delete);
        assert_eq!(last_edit(&mut action_rx).as_deref(), Some("abcdef"));

        press(&mut editor, KeyCode::End);
        press(&mut editor, KeyCode::Delete);
        assert_eq!(last_edit(&mut action_rx), None);
    }

    #[test]
    fn follows_the_state_only_when_the_revision_moves() {
        let (mut editor, _action_rx) = editor_with(Some("shared"));
        press(&mut editor, KeyCode::End);
        press(&mut editor, KeyCode::Char('!'));

        // the store echoes our own edit without a new revision
        let echoed = State {
            code: Some(String::from("shared")),
            ..Default::default()
        };
        let mut editor = editor.move_with_state(&echoed);
        assert_eq!(editor.text(), "shared!");

        let replaced = State {
            code: Some(String::from("hi")),
            code_revision: 1,
            ..Default::default()
        };
        editor = editor.move_with_state(&replaced);
        assert_eq!(editor.text(), "hi");
        assert_eq!(editor.cursor, (0, 2));
    }

    #[test]
    fn scrolls_to_keep_the_cursor_visible() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(3, 0), 3);
    }
}
