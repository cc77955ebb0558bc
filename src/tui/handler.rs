use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::Side;
use crate::services::share::ShareTarget;

/// Which keymap applies, from the topmost popup down to the active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Help,
    DraftPrompt,
    Demographics,
    Search,
    List,
    Detail,
    Write,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    OpenPost,
    Back,
    Refresh,
    CycleCategory,
    ToggleSort,
    NewPost,
    Vote(Side),
    Share(ShareTarget),
    ShowHelp,
    HideHelp,
    // Search input actions
    SearchStart,
    SearchChar(char),
    SearchBackspace,
    SearchConfirm,
    SearchCancel,
    // Demographics prompt actions
    DemographicsNextRow,
    DemographicsPrevRow,
    DemographicsNextOption,
    DemographicsPrevOption,
    DemographicsSubmit,
    DemographicsCancel,
    // Draft prompt actions
    DraftRestore,
    DraftDiscard,
    // Write form actions
    FormChar(char),
    FormBackspace,
    FormNewline,
    FormNextField,
    FormPrevField,
    FormSubmit,
    FormCancel,
}

pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match mode {
        // If help is showing, any key closes it
        InputMode::Help => Some(AppAction::HideHelp),

        InputMode::DraftPrompt => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                Some(AppAction::DraftRestore)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                Some(AppAction::DraftDiscard)
            }
            _ => None,
        },

        InputMode::Demographics => match key.code {
            KeyCode::Enter => Some(AppAction::DemographicsSubmit),
            KeyCode::Esc => Some(AppAction::DemographicsCancel),
            KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => {
                Some(AppAction::DemographicsNextRow)
            }
            KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => {
                Some(AppAction::DemographicsPrevRow)
            }
            KeyCode::Right | KeyCode::Char('l') => Some(AppAction::DemographicsNextOption),
            KeyCode::Left | KeyCode::Char('h') => Some(AppAction::DemographicsPrevOption),
            _ => None,
        },

        InputMode::Search => match key.code {
            KeyCode::Enter => Some(AppAction::SearchConfirm),
            KeyCode::Esc => Some(AppAction::SearchCancel),
            KeyCode::Backspace => Some(AppAction::SearchBackspace),
            KeyCode::Char(c) => Some(AppAction::SearchChar(c)),
            _ => None,
        },

        InputMode::Write => match (key.code, key.modifiers) {
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => {
                Some(AppAction::FormSubmit)
            }
            (KeyCode::Esc, _) => Some(AppAction::FormCancel),
            (KeyCode::Tab, _) => Some(AppAction::FormNextField),
            (KeyCode::BackTab, _) => Some(AppAction::FormPrevField),
            (KeyCode::Enter, _) => Some(AppAction::FormNewline),
            (KeyCode::Backspace, _) => Some(AppAction::FormBackspace),
            (KeyCode::Char(c), _) => Some(AppAction::FormChar(c)),
            _ => None,
        },

        InputMode::List => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Enter => Some(AppAction::OpenPost),
            KeyCode::Char('r') => Some(AppAction::Refresh),
            KeyCode::Char('c') => Some(AppAction::CycleCategory),
            KeyCode::Char('s') => Some(AppAction::ToggleSort),
            KeyCode::Char('/') => Some(AppAction::SearchStart),
            KeyCode::Char('w') => Some(AppAction::NewPost),
            KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },

        InputMode::Detail => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Esc | KeyCode::Backspace => Some(AppAction::Back),
            KeyCode::Char('a') | KeyCode::Char('1') => Some(AppAction::Vote(Side::A)),
            KeyCode::Char('b') | KeyCode::Char('2') => Some(AppAction::Vote(Side::B)),
            KeyCode::Char('y') => Some(AppAction::Share(ShareTarget::CopyLink)),
            KeyCode::Char('t') => Some(AppAction::Share(ShareTarget::Twitter)),
            KeyCode::Char('k') => Some(AppAction::Share(ShareTarget::Kakao)),
            KeyCode::Char('w') => Some(AppAction::NewPost),
            KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn letters_are_text_while_writing() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q')), InputMode::Write),
            Some(AppAction::FormChar('q'))
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q')), InputMode::Search),
            Some(AppAction::SearchChar('q'))
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q')), InputMode::List),
            Some(AppAction::Quit)
        );
    }

    #[test]
    fn ctrl_s_submits_form() {
        let event = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(
            handle_key_event(event, InputMode::Write),
            Some(AppAction::FormSubmit)
        );
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(event, InputMode::Write), Some(AppAction::Quit));
        assert_eq!(handle_key_event(event, InputMode::Help), Some(AppAction::Quit));
    }

    #[test]
    fn detail_keys_vote_for_each_side() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('a')), InputMode::Detail),
            Some(AppAction::Vote(Side::A))
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('2')), InputMode::Detail),
            Some(AppAction::Vote(Side::B))
        );
    }

    #[test]
    fn any_key_closes_help() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('x')), InputMode::Help),
            Some(AppAction::HideHelp)
        );
    }
}
