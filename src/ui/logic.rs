//! 业务逻辑处理 (Update/Dispatch)
//!
//! 把界面 Action 翻译为 Store 的 Intent，并根据结果更新界面状态

use tracing::{info, warn};

use super::actions::Action;
use super::state::{App, AppMode, ConfirmAction};
use crate::models::Priority;
use crate::store::{Event, Intent, Outcome};

impl App {
    /// 核心逻辑分发，返回 true 表示退出
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::MoveSelectionUp => self.move_up(),
            Action::MoveSelectionDown => self.move_down(),

            Action::StartAddTask => self.start_add_task(),
            Action::CyclePriority => {
                if self.mode == AppMode::AddingTask {
                    self.draft_priority = self.draft_priority.next();
                }
            }
            Action::ToggleSelected => self.toggle_selected(),
            Action::StartDeleteTask => self.start_delete_task(),

            Action::ToggleTimer => {
                self.apply(Intent::ToggleTimer);
            }
            Action::ResetTimer => {
                self.apply(Intent::ResetTimer);
            }
            Action::SelectPreset(index) => self.select_preset(index),
            Action::StartCustomDuration => self.start_custom_duration(),

            Action::ToggleTheme => {
                self.apply(Intent::ToggleDarkMode);
            }

            Action::Cancel => {
                if self.mode == AppMode::TimerAlert {
                    self.dismiss_alert();
                } else {
                    self.cancel();
                }
            }

            Action::Submit => match &self.mode {
                AppMode::AddingTask => self.confirm_add_task(),
                AppMode::CustomDuration => self.confirm_custom_duration(),
                AppMode::Confirm(_) => self.execute_confirm(),
                AppMode::TimerAlert => self.dismiss_alert(),
                AppMode::Normal => {}
            },

            Action::Input(c) => {
                if matches!(self.mode, AppMode::AddingTask | AppMode::CustomDuration) {
                    self.input_buffer.push(c);
                }
            }

            Action::DeleteChar => {
                if matches!(self.mode, AppMode::AddingTask | AppMode::CustomDuration) {
                    self.input_buffer.pop();
                }
            }
        }
        false
    }

    /// 计时驱动每秒调用一次
    pub fn tick(&mut self) {
        self.apply(Intent::Tick);
    }

    pub fn system_theme_changed(&mut self, prefers_dark: bool) {
        self.apply(Intent::SystemThemeChanged(prefers_dark));
    }

    /// 把 Intent 交给 Store，并处理返回的事件
    fn apply(&mut self, intent: Intent) -> Outcome {
        let outcome = self.store.dispatch(intent);
        match &outcome.event {
            Some(Event::TaskAdded(_)) => {
                self.selected_index = self.store.state().tasks.len().saturating_sub(1);
                self.message = Some("任务已添加".to_string());
            }
            Some(Event::PointsAwarded { points, .. }) => {
                self.message = Some(format!("完成任务，获得 {} 积分", points));
            }
            Some(Event::TimerCompleted) => self.on_timer_completed(),
            None => {}
        }
        outcome
    }

    /// 到期提醒：响铃失败只记录日志
    fn on_timer_completed(&mut self) {
        info!("focus timer completed");
        if let Err(e) = self.notifier.notify() {
            warn!(error = %e, "failed to ring bell");
        }
        let previous = std::mem::replace(&mut self.mode, AppMode::TimerAlert);
        if !matches!(previous, AppMode::Normal | AppMode::TimerAlert) {
            self.interrupted_mode = Some(previous);
        }
    }

    /// 关闭到期提示，回到被打断的对话框（输入内容保留）
    pub fn dismiss_alert(&mut self) {
        self.mode = self.interrupted_mode.take().unwrap_or(AppMode::Normal);
    }

    // ============ 导航相关 ============

    /// 向上移动选择
    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// 向下移动选择
    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.store.state().tasks.len() {
            self.selected_index += 1;
        }
    }

    // ============ 任务相关 ============

    /// 开始添加任务
    pub fn start_add_task(&mut self) {
        self.mode = AppMode::AddingTask;
        self.input_buffer.clear();
        self.draft_priority = Priority::default();
    }

    /// 确认添加任务；标题为空时停留在表单
    pub fn confirm_add_task(&mut self) {
        let title = self.input_buffer.trim().to_string();
        if title.is_empty() {
            self.message = Some("标题不能为空".to_string());
            return;
        }
        self.apply(Intent::AddTask {
            title,
            priority: self.draft_priority,
        });
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
    }

    /// 切换选中任务的完成状态
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.apply(Intent::ToggleTask(id));
        }
    }

    /// 开始删除任务
    pub fn start_delete_task(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.mode = AppMode::Confirm(ConfirmAction::Delete(id));
        }
    }

    /// 执行确认操作
    pub fn execute_confirm(&mut self) {
        if let AppMode::Confirm(ConfirmAction::Delete(id)) = &self.mode {
            let id = id.clone();
            if self.apply(Intent::DeleteTask(id)).changed {
                self.message = Some("任务已删除".to_string());
            }
        }
        self.clamp_selection();
        self.mode = AppMode::Normal;
    }

    // ============ 计时器相关 ============

    pub fn select_preset(&mut self, index: usize) {
        if let Some(&minutes) = self.presets.get(index) {
            self.apply(Intent::SetDuration(i64::from(minutes)));
            self.message = Some(format!("时长已设为 {} 分钟", minutes));
        }
    }

    /// 开始输入自定义时长
    pub fn start_custom_duration(&mut self) {
        self.mode = AppMode::CustomDuration;
        self.input_buffer.clear();
    }

    /// 确认自定义时长；非正整数直接忽略
    pub fn confirm_custom_duration(&mut self) {
        match self.input_buffer.trim().parse::<i64>() {
            Ok(minutes) if minutes > 0 => {
                if self.apply(Intent::SetDuration(minutes)).changed {
                    self.message = Some(format!("时长已设为 {} 分钟", minutes));
                }
                self.mode = AppMode::Normal;
                self.input_buffer.clear();
            }
            _ => {
                self.message = Some("请输入正整数分钟数".to_string());
                self.input_buffer.clear();
            }
        }
    }

    // ============ 通用操作 ============

    /// 取消当前操作
    pub fn cancel(&mut self) {
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
        self.message = None;
    }
}
