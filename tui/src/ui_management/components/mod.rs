use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{prelude::Backend, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};

pub mod code_editor;
pub mod input_box;
pub mod usage;

/// A stateful piece of the UI. It is carried over to every published [State]
/// and turns key presses into [Action]s for the store.
pub trait Component {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized;
    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized;

    fn name(&self) -> &str;

    fn on_key_press(&mut self, key: KeyEvent);

    /// Releases and repeats are dropped, terminals disagree on reporting them
    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Press {
            self.on_key_press(key);
        }
    }
}

pub trait ComponentRender<Props> {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: Props);
}
