//! App 状态定义 (Model)
//!
//! 包含界面状态结构体及相关枚举。业务状态全部在 Store 中。

use crate::models::{Priority, Task};
use crate::platform::Notifier;
use crate::store::Store;

/// 应用状态
pub struct App {
    pub store: Store,
    pub presets: Vec<u32>,
    pub selected_index: usize,
    pub mode: AppMode,
    pub input_buffer: String,
    pub draft_priority: Priority,
    pub message: Option<String>,
    pub notifier: Box<dyn Notifier>,
    /// 到期提示打断的对话框，关闭提示后恢复
    pub interrupted_mode: Option<AppMode>,
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    AddingTask,
    CustomDuration,
    Confirm(ConfirmAction),
    /// 计时结束的阻塞提示，必须确认后才能继续操作
    TimerAlert,
}

/// 确认操作类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    Delete(String),
}

impl App {
    /// 创建新的应用实例
    pub fn new(store: Store, presets: Vec<u32>, notifier: Box<dyn Notifier>) -> Self {
        let mut app = Self {
            store,
            presets,
            selected_index: 0,
            mode: AppMode::Normal,
            input_buffer: String::new(),
            draft_priority: Priority::default(),
            message: None,
            notifier,
            interrupted_mode: None,
        };
        app.clamp_selection();
        app
    }

    /// 确保选中索引有效
    pub fn clamp_selection(&mut self) {
        let len = self.store.state().tasks.len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    /// 获取当前选中的任务
    pub fn selected_task(&self) -> Option<&Task> {
        self.store.state().tasks.get(self.selected_index)
    }

    /// 获取当前选中的任务 ID
    pub fn selected_task_id(&self) -> Option<String> {
        self.selected_task().map(|task| task.id.clone())
    }
}
