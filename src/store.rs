//! 状态容器 (Store)
//!
//! 唯一持有 `AppState` 的单写者容器。所有修改都经由 [`Store::dispatch`]，
//! 每个 Intent 同步执行到底，之后再通知观察者（持久化等）。
//! 非法输入与找不到的任务 ID 一律视为空操作，不返回错误。

use tracing::debug;

use crate::models::{AppState, Priority, Task, TimerSettings};

/// 修改状态的意图
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    AddTask { title: String, priority: Priority },
    ToggleTask(String),
    DeleteTask(String),
    UpdateTimer(TimerUpdate),
    /// 分钟数允许非正值，由 Store 负责拒绝
    SetDuration(i64),
    StartTimer,
    PauseTimer,
    ToggleTimer,
    ResetTimer,
    Tick,
    ToggleDarkMode,
    /// 系统主题偏好变化（用户手动切换过主题后不再生效）
    SystemThemeChanged(bool),
}

/// 计时器的局部更新，仅覆盖给出的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerUpdate {
    pub duration_minutes: Option<u32>,
    pub is_running: Option<bool>,
    pub time_left_seconds: Option<u32>,
}

/// Intent 产生的可观察事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TaskAdded(String),
    PointsAwarded { task_id: String, points: u32 },
    /// 每次到期只发出一次
    TimerCompleted,
}

/// 一次 dispatch 的结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    pub changed: bool,
    pub event: Option<Event>,
}

impl Outcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            event: None,
        }
    }

    fn with_event(event: Event) -> Self {
        Self {
            changed: true,
            event: Some(event),
        }
    }
}

/// 交给观察者的只读快照
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub state: &'a AppState,
    /// 用户手动选择的主题；`None` 表示仍跟随系统
    pub theme_override: Option<bool>,
}

/// 状态变化观察者
pub trait StateObserver {
    fn state_changed(&mut self, snapshot: Snapshot<'_>);
}

pub struct Store {
    state: AppState,
    theme_override: Option<bool>,
    observers: Vec<Box<dyn StateObserver>>,
}

impl Store {
    pub fn new(state: AppState, theme_override: Option<bool>) -> Self {
        Self {
            state,
            theme_override,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn theme_override(&self) -> Option<bool> {
        self.theme_override
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    /// 应用一个 Intent，状态有变化时通知所有观察者
    pub fn dispatch(&mut self, intent: Intent) -> Outcome {
        let is_tick = intent == Intent::Tick;
        if !is_tick {
            debug!(?intent, "dispatch");
        }

        let outcome = self.apply(intent);

        if outcome.changed {
            let snapshot = Snapshot {
                state: &self.state,
                theme_override: self.theme_override,
            };
            for observer in &mut self.observers {
                observer.state_changed(snapshot);
            }
        }
        outcome
    }

    fn apply(&mut self, intent: Intent) -> Outcome {
        match intent {
            Intent::AddTask { title, priority } => self.add_task(&title, priority),
            Intent::ToggleTask(id) => self.toggle_task(&id),
            Intent::DeleteTask(id) => self.delete_task(&id),
            Intent::UpdateTimer(update) => self.update_timer(update),
            Intent::SetDuration(minutes) => self.set_duration(minutes),
            Intent::StartTimer => self.start_timer(),
            Intent::PauseTimer => self.update_timer(TimerUpdate {
                is_running: Some(false),
                ..TimerUpdate::default()
            }),
            Intent::ToggleTimer => {
                if self.state.timer_settings.is_running {
                    self.apply(Intent::PauseTimer)
                } else {
                    self.start_timer()
                }
            }
            Intent::ResetTimer => {
                let full = self.state.timer_settings.full_seconds();
                self.update_timer(TimerUpdate {
                    is_running: Some(false),
                    time_left_seconds: Some(full),
                    ..TimerUpdate::default()
                })
            }
            Intent::Tick => self.tick(),
            Intent::ToggleDarkMode => {
                self.state.dark_mode = !self.state.dark_mode;
                self.theme_override = Some(self.state.dark_mode);
                Outcome::changed()
            }
            Intent::SystemThemeChanged(prefers_dark) => {
                if self.theme_override.is_some() || self.state.dark_mode == prefers_dark {
                    return Outcome::unchanged();
                }
                self.state.dark_mode = prefers_dark;
                Outcome::changed()
            }
        }
    }

    // ============ 任务 ============

    fn add_task(&mut self, title: &str, priority: Priority) -> Outcome {
        let title = title.trim();
        if title.is_empty() {
            return Outcome::unchanged();
        }
        let task = Task::new(title.to_string(), priority);
        let id = task.id.clone();
        self.state.tasks.push(task);
        Outcome::with_event(Event::TaskAdded(id))
    }

    /// 首次由未完成变为完成时发放奖励；取消完成不回收积分
    fn toggle_task(&mut self, id: &str) -> Outcome {
        let Some(task) = self.state.tasks.iter_mut().find(|task| task.id == id) else {
            return Outcome::unchanged();
        };

        task.completed = !task.completed;
        if !task.completed || task.points_awarded {
            return Outcome::changed();
        }

        task.points_awarded = true;
        let priority = task.priority;
        self.state.profile.award(priority);
        Outcome::with_event(Event::PointsAwarded {
            task_id: id.to_string(),
            points: priority.points(),
        })
    }

    fn delete_task(&mut self, id: &str) -> Outcome {
        let before = self.state.tasks.len();
        self.state.tasks.retain(|task| task.id != id);
        if self.state.tasks.len() == before {
            Outcome::unchanged()
        } else {
            Outcome::changed()
        }
    }

    // ============ 计时器 ============

    fn update_timer(&mut self, update: TimerUpdate) -> Outcome {
        let timer = &mut self.state.timer_settings;
        let before = timer.clone();
        if let Some(minutes) = update.duration_minutes {
            timer.duration_minutes = minutes;
        }
        if let Some(running) = update.is_running {
            timer.is_running = running;
        }
        if let Some(left) = update.time_left_seconds {
            timer.time_left_seconds = left;
        }

        if *timer == before {
            Outcome::unchanged()
        } else {
            Outcome::changed()
        }
    }

    fn set_duration(&mut self, minutes: i64) -> Outcome {
        let Ok(minutes) = u32::try_from(minutes) else {
            return Outcome::unchanged();
        };
        // 超过该值时秒数无法用 u32 表示
        if minutes == 0 || minutes > u32::MAX / 60 {
            return Outcome::unchanged();
        }

        let next = TimerSettings::with_duration(minutes);
        if self.state.timer_settings == next {
            return Outcome::unchanged();
        }
        self.state.timer_settings = next;
        Outcome::changed()
    }

    /// 已到期的计时器必须先重置才能再次启动
    fn start_timer(&mut self) -> Outcome {
        if self.state.timer_settings.time_left_seconds == 0 {
            return Outcome::unchanged();
        }
        self.update_timer(TimerUpdate {
            is_running: Some(true),
            ..TimerUpdate::default()
        })
    }

    fn tick(&mut self) -> Outcome {
        let timer = &mut self.state.timer_settings;
        if !timer.is_running {
            return Outcome::unchanged();
        }

        if timer.time_left_seconds > 0 {
            timer.time_left_seconds -= 1;
        }
        if timer.time_left_seconds == 0 {
            timer.is_running = false;
            return Outcome::with_event(Event::TimerCompleted);
        }
        Outcome::changed()
    }
}
