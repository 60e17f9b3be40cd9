use crossterm::event::KeyEvent;
use ratatui::{prelude::Backend, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, Route, State};

use self::{editor_page::EditorPage, entry_page::EntryPage};

use super::components::{Component, ComponentRender};

mod editor_page;
mod entry_page;
mod notifications;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ActivePage {
    EntryPage,
    EditorPage,
}

struct Props {
    active_page: ActivePage,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            active_page: match state.route {
                Route::Editor { .. } => ActivePage::EditorPage,
                Route::Entry => ActivePage::EntryPage,
            },
        }
    }
}

/// AppRouter renders the page the state's route points at and forwards key presses to it
pub struct AppRouter {
    action_tx: UnboundedSender<Action>,
    props: Props,
    //
    entry_page: EntryPage,
    editor_page: EditorPage,
}

impl AppRouter {
    fn get_active_page_component(&self) -> &dyn Component {
        match self.props.active_page {
            ActivePage::EntryPage => &self.entry_page,
            ActivePage::EditorPage => &self.editor_page,
        }
    }

    fn get_active_page_component_mut(&mut self) -> &mut dyn Component {
        match self.props.active_page {
            ActivePage::EntryPage => &mut self.entry_page,
            ActivePage::EditorPage => &mut self.editor_page,
        }
    }
}

impl Component for AppRouter {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        AppRouter {
            action_tx: action_tx.clone(),
            props: Props::from(state),
            //
            entry_page: EntryPage::new(state, action_tx.clone()),
            editor_page: EditorPage::new(state, action_tx),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        let props = Props::from(state);

        // every visit of the editor page starts from a fresh page
        let editor_page = if props.active_page == ActivePage::EditorPage
            && self.props.active_page != ActivePage::EditorPage
        {
            EditorPage::new(state, self.action_tx.clone())
        } else {
            self.editor_page.move_with_state(state)
        };

        AppRouter {
            action_tx: self.action_tx,
            props,
            //
            entry_page: self.entry_page.move_with_state(state),
            editor_page,
        }
    }

    // route all functions to the active page
    fn name(&self) -> &str {
        self.get_active_page_component().name()
    }

    fn on_key_press(&mut self, key: KeyEvent) {
        self.get_active_page_component_mut().on_key_press(key)
    }
}

impl ComponentRender<()> for AppRouter {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: ()) {
        match self.props.active_page {
            ActivePage::EntryPage => self.entry_page.render(frame, props),
            ActivePage::EditorPage => self.editor_page.render(frame, props),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn follows_the_route() {
        let (action_tx, _action_rx) = mpsc::unbounded_channel();
        let router = AppRouter::new(&State::default(), action_tx);
        assert_eq!(router.name(), "Entry Page");

        let state = State {
            route: Route::editor("abc", Some("ada")),
            ..Default::default()
        };
        let router = router.move_with_state(&state);
        assert_eq!(router.name(), "Editor Page");

        let router = router.move_with_state(&State::default());
        assert_eq!(router.name(), "Entry Page");
    }
}
