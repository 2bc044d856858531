use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 默认专注时长（分钟）
pub const DEFAULT_DURATION_MINUTES: u32 = 25;

/// 任务优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// 首次完成时奖励的积分
    pub fn points(self) -> u32 {
        match self {
            Priority::High => 10,
            Priority::Medium => 5,
            Priority::Low => 3,
        }
    }

    /// 添加表单中循环切换：高 -> 中 -> 低 -> 高
    pub fn next(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "高",
            Priority::Medium => "中",
            Priority::Low => "低",
        }
    }
}

/// 待办任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "Local::now")]
    pub created_at: DateTime<Local>,
    /// 一旦置位永不清除，保证同一任务只奖励一次
    #[serde(default)]
    pub points_awarded: bool,
}

impl Task {
    pub fn new(title: String, priority: Priority) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            priority,
            completed: false,
            created_at: Local::now(),
            points_awarded: false,
        }
    }
}

/// 计时器所处阶段（由 TimerSettings 推导，不单独存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Expired,
}

/// 番茄钟设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub duration_minutes: u32,
    pub is_running: bool,
    pub time_left_seconds: u32,
}

impl TimerSettings {
    /// 以给定时长创建处于 Idle 状态的计时器
    pub fn with_duration(minutes: u32) -> Self {
        Self {
            duration_minutes: minutes,
            is_running: false,
            time_left_seconds: minutes.saturating_mul(60),
        }
    }

    pub fn full_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.time_left_seconds == 0 {
            TimerPhase::Expired
        } else if self.time_left_seconds >= self.full_seconds() {
            TimerPhase::Idle
        } else {
            TimerPhase::Paused
        }
    }

    /// 剩余比例，范围 0.0 ~ 1.0
    pub fn progress(&self) -> f64 {
        let full = self.full_seconds();
        if full == 0 {
            return 0.0;
        }
        (f64::from(self.time_left_seconds) / f64::from(full)).clamp(0.0, 1.0)
    }

    /// 格式化为 MM:SS
    pub fn format_time_left(&self) -> String {
        let mins = self.time_left_seconds / 60;
        let secs = self.time_left_seconds % 60;
        format!("{:02}:{:02}", mins, secs)
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::with_duration(DEFAULT_DURATION_MINUTES)
    }
}

/// 积分档案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub points: u32,
    pub tasks_completed: u32,
    pub high_priority_completed: u32,
    pub medium_priority_completed: u32,
    pub low_priority_completed: u32,
}

impl Profile {
    /// 记一次奖励：积分、总完成数与对应优先级计数同时增加
    ///
    /// 存储中的计数可能已接近上限，这里饱和而不溢出。
    pub fn award(&mut self, priority: Priority) {
        self.points = self.points.saturating_add(priority.points());
        self.tasks_completed = self.tasks_completed.saturating_add(1);
        let counter = match priority {
            Priority::High => &mut self.high_priority_completed,
            Priority::Medium => &mut self.medium_priority_completed,
            Priority::Low => &mut self.low_priority_completed,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn completed_for(&self, priority: Priority) -> u32 {
        match priority {
            Priority::High => self.high_priority_completed,
            Priority::Medium => self.medium_priority_completed,
            Priority::Low => self.low_priority_completed,
        }
    }
}

/// 应用根状态，由 Store 独占持有
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub dark_mode: bool,
    pub timer_settings: TimerSettings,
    pub profile: Profile,
    pub tasks: Vec<Task>,
}

impl AppState {
    pub fn new(dark_mode: bool, duration_minutes: u32) -> Self {
        Self {
            dark_mode,
            timer_settings: TimerSettings::with_duration(duration_minutes),
            profile: Profile::default(),
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    /// 已完成任务占比，无任务时为 0
    pub fn completion_ratio(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.tasks.len() as f64
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(true, DEFAULT_DURATION_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_unawarded() {
        let task = Task::new("Write report".to_string(), Priority::High);
        assert!(!task.completed);
        assert!(!task.points_awarded);
        assert!(!task.id.is_empty());

        let other = Task::new("Write report".to_string(), Priority::High);
        assert_ne!(task.id, other.id);
    }

    #[test]
    fn test_award_per_priority() {
        let mut profile = Profile::default();
        profile.award(Priority::High);
        profile.award(Priority::Medium);
        profile.award(Priority::Low);
        profile.award(Priority::Low);

        assert_eq!(profile.points, 10 + 5 + 3 + 3);
        assert_eq!(profile.tasks_completed, 4);
        assert_eq!(profile.completed_for(Priority::High), 1);
        assert_eq!(profile.completed_for(Priority::Medium), 1);
        assert_eq!(profile.completed_for(Priority::Low), 2);
    }

    #[test]
    fn test_award_saturates() {
        let mut profile = Profile {
            points: u32::MAX - 1,
            tasks_completed: u32::MAX,
            high_priority_completed: u32::MAX,
            ..Profile::default()
        };
        profile.award(Priority::High);

        assert_eq!(profile.points, u32::MAX);
        assert_eq!(profile.tasks_completed, u32::MAX);
        assert_eq!(profile.high_priority_completed, u32::MAX);
    }

    #[test]
    fn test_timer_phase() {
        let mut timer = TimerSettings::with_duration(1);
        assert_eq!(timer.phase(), TimerPhase::Idle);

        timer.is_running = true;
        assert_eq!(timer.phase(), TimerPhase::Running);

        timer.is_running = false;
        timer.time_left_seconds = 30;
        assert_eq!(timer.phase(), TimerPhase::Paused);

        timer.time_left_seconds = 0;
        assert_eq!(timer.phase(), TimerPhase::Expired);
    }

    #[test]
    fn test_format_and_progress() {
        let mut timer = TimerSettings::default();
        assert_eq!(timer.format_time_left(), "25:00");
        assert_eq!(timer.progress(), 1.0);

        timer.time_left_seconds = 750;
        assert_eq!(timer.format_time_left(), "12:30");
        assert!((timer.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_ratio() {
        let mut state = AppState::default();
        assert_eq!(state.completion_ratio(), 0.0);

        state.tasks.push(Task::new("a".to_string(), Priority::Low));
        state.tasks.push(Task::new("b".to_string(), Priority::Low));
        state.tasks[0].completed = true;
        assert_eq!(state.completed_count(), 1);
        assert!((state.completion_ratio() - 0.5).abs() < f64::EPSILON);
    }
}
