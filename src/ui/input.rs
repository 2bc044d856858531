//! 键盘事件映射 (Input -> Action)
//!
//! 将按键事件转换为 Action

use crossterm::event::KeyCode;

use super::actions::Action;
use super::state::{App, AppMode};

/// 根据当前模式和按键获取对应的 Action
pub fn get_action(mode: &AppMode, key: KeyCode) -> Option<Action> {
    match mode {
        AppMode::Normal => match key {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelectionDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelectionUp),
            KeyCode::Char('a') => Some(Action::StartAddTask),
            KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => {
                Some(Action::ToggleSelected)
            }
            KeyCode::Char('d') => Some(Action::StartDeleteTask),
            KeyCode::Char('s') => Some(Action::ToggleTimer),
            KeyCode::Char('r') => Some(Action::ResetTimer),
            KeyCode::Char('c') => Some(Action::StartCustomDuration),
            KeyCode::Char('t') => Some(Action::ToggleTheme),
            KeyCode::Char(c @ '1'..='9') => {
                c.to_digit(10).map(|n| Action::SelectPreset(n as usize - 1))
            }
            _ => None,
        },
        AppMode::AddingTask => match key {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Tab => Some(Action::CyclePriority),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::CustomDuration => match key {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::Confirm(_) => match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Submit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        AppMode::TimerAlert => match key {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Submit),
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
    }
}

/// 处理按键事件，返回 true 表示退出
pub fn handle_key_event(app: &mut App, key: KeyCode) -> bool {
    match get_action(&app.mode, key) {
        Some(action) => app.dispatch(action),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::state::ConfirmAction;

    #[test]
    fn test_normal_mode_keys() {
        let mode = AppMode::Normal;
        assert_eq!(get_action(&mode, KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(
            get_action(&mode, KeyCode::Char('1')),
            Some(Action::SelectPreset(0))
        );
        assert_eq!(
            get_action(&mode, KeyCode::Char('9')),
            Some(Action::SelectPreset(8))
        );
        assert_eq!(get_action(&mode, KeyCode::Char('0')), None);
        assert_eq!(
            get_action(&mode, KeyCode::Char(' ')),
            Some(Action::ToggleSelected)
        );
    }

    #[test]
    fn test_text_modes_capture_characters() {
        for mode in [AppMode::AddingTask, AppMode::CustomDuration] {
            assert_eq!(
                get_action(&mode, KeyCode::Char('q')),
                Some(Action::Input('q'))
            );
            assert_eq!(get_action(&mode, KeyCode::Esc), Some(Action::Cancel));
        }
        assert_eq!(
            get_action(&AppMode::AddingTask, KeyCode::Tab),
            Some(Action::CyclePriority)
        );
    }

    #[test]
    fn test_modal_modes() {
        let confirm = AppMode::Confirm(ConfirmAction::Delete("id".to_string()));
        assert_eq!(get_action(&confirm, KeyCode::Char('y')), Some(Action::Submit));
        assert_eq!(get_action(&confirm, KeyCode::Char('q')), None);

        assert_eq!(
            get_action(&AppMode::TimerAlert, KeyCode::Enter),
            Some(Action::Submit)
        );
        assert_eq!(get_action(&AppMode::TimerAlert, KeyCode::Char('q')), None);
    }
}
