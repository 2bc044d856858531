//! 持久化适配器
//!
//! 状态以 TOML 文本存放在一个简单的键值存储中。加载永不失败：
//! 缺失或损坏的数据回退为默认值，部分字段逐项覆盖默认值。

#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::models::{AppState, Profile, Task};
use crate::store::{Snapshot, StateObserver};

/// 存放 AppState 的固定键
pub const STATE_KEY: &str = "todo-pomodoro-state";
/// 存放用户手动主题选择的键
pub const THEME_KEY: &str = "theme";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// 文本键值存储
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// 每个键对应数据目录下的一个文件
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.toml", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            path: self.dir.clone(),
            source,
        })?;

        // 先写临时文件再改名，避免中途失败留下半截数据
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, value).map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Write { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write { path, source }),
        }
    }
}

/// 内存存储，用于测试
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============ 编解码 ============

/// 存储中的状态形态：每个字段都可缺省，未知字段忽略
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredState {
    /// 逐条解析，单条损坏不影响其余数据
    tasks: Option<Vec<toml::Value>>,
    timer_settings: Option<StoredTimer>,
    dark_mode: Option<bool>,
    profile: Option<Profile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredTimer {
    #[serde(alias = "duration")]
    duration_minutes: Option<u32>,
    is_running: Option<bool>,
    #[serde(alias = "timeLeft")]
    time_left_seconds: Option<u32>,
}

pub fn encode_state(state: &AppState) -> Result<String> {
    Ok(toml::to_string_pretty(state)?)
}

/// 将存储内容逐字段合并到 `defaults` 之上
pub fn decode_state(
    content: &str,
    defaults: AppState,
) -> std::result::Result<AppState, toml::de::Error> {
    let stored: StoredState = toml::from_str(content)?;
    let mut state = defaults;

    if let Some(tasks) = stored.tasks {
        state.tasks = decode_tasks(tasks);
    }
    if let Some(dark_mode) = stored.dark_mode {
        state.dark_mode = dark_mode;
    }
    if let Some(profile) = stored.profile {
        state.profile = profile;
    }
    if let Some(timer) = stored.timer_settings {
        let settings = &mut state.timer_settings;
        if let Some(minutes) = timer.duration_minutes.filter(|m| *m > 0) {
            settings.duration_minutes = minutes;
            settings.time_left_seconds = settings.full_seconds();
        }
        if let Some(running) = timer.is_running {
            settings.is_running = running;
        }
        if let Some(left) = timer.time_left_seconds {
            settings.time_left_seconds = left.min(settings.full_seconds());
        }
    }
    Ok(state)
}

fn decode_tasks(values: Vec<toml::Value>) -> Vec<Task> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match value.try_into::<Task>() {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed stored task");
                None
            }
        })
        .collect()
}

/// 加载状态；任何失败都回退为 `defaults`
pub fn load_state(store: &impl KeyValueStore, defaults: AppState) -> AppState {
    let content = match store.get(STATE_KEY) {
        Ok(Some(content)) => content,
        Ok(None) => return defaults,
        Err(e) => {
            warn!(error = %e, "could not read stored state, using defaults");
            return defaults;
        }
    };

    match decode_state(&content, defaults.clone()) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "stored state is malformed, using defaults");
            defaults
        }
    }
}

pub fn save_state(store: &mut impl KeyValueStore, state: &AppState) -> Result<()> {
    let content = encode_state(state)?;
    store.set(STATE_KEY, &content)
}

/// 读取用户手动选择的主题；未选择过或内容无法识别时为 `None`
pub fn load_theme_override(store: &impl KeyValueStore) -> Option<bool> {
    match store.get(THEME_KEY) {
        Ok(Some(value)) => match value.trim() {
            "dark" => Some(true),
            "light" => Some(false),
            other => {
                warn!(value = other, "ignoring unknown theme override");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "could not read theme override");
            None
        }
    }
}

pub fn save_theme_override(store: &mut impl KeyValueStore, theme: Option<bool>) -> Result<()> {
    match theme {
        Some(true) => store.set(THEME_KEY, "dark"),
        Some(false) => store.set(THEME_KEY, "light"),
        None => store.remove(THEME_KEY),
    }
}

/// 作为 Store 观察者，在每次变化后尽力写入存储
pub struct Persistence<S> {
    store: S,
    saved_theme: Option<bool>,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S, saved_theme: Option<bool>) -> Self {
        Self { store, saved_theme }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> StateObserver for Persistence<S> {
    fn state_changed(&mut self, snapshot: Snapshot<'_>) {
        if let Err(e) = save_state(&mut self.store, snapshot.state) {
            warn!(error = %e, "failed to persist state");
        }

        if snapshot.theme_override != self.saved_theme {
            match save_theme_override(&mut self.store, snapshot.theme_override) {
                Ok(()) => self.saved_theme = snapshot.theme_override,
                Err(e) => warn!(error = %e, "failed to persist theme override"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TimerSettings};
    use crate::store::{Intent, Store};

    fn sample_state() -> AppState {
        let mut state = AppState::new(true, 45);
        state.tasks.push(Task::new("Write report".to_string(), Priority::High));
        state.tasks.push(Task::new("Water plants".to_string(), Priority::Low));
        state.tasks[0].completed = true;
        state.tasks[0].points_awarded = true;
        state.profile.award(Priority::High);
        state.timer_settings.is_running = true;
        state.timer_settings.time_left_seconds = 1234;
        state
    }

    #[test]
    fn test_round_trip() {
        let state = sample_state();
        let mut store = MemoryStore::default();
        save_state(&mut store, &state).unwrap();

        let loaded = load_state(&store, AppState::default());
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_round_trip_without_tasks() {
        let state = AppState::new(false, 25);
        let content = encode_state(&state).unwrap();
        assert_eq!(decode_state(&content, AppState::default()).unwrap(), state);
    }

    #[test]
    fn test_missing_and_empty_payload_use_defaults() {
        let defaults = AppState::new(false, 25);
        let mut store = MemoryStore::default();
        assert_eq!(load_state(&store, defaults.clone()), defaults);

        store.set(STATE_KEY, "").unwrap();
        assert_eq!(load_state(&store, defaults.clone()), defaults);
    }

    #[test]
    fn test_malformed_payload_uses_defaults() {
        let defaults = AppState::new(true, 25);
        let mut store = MemoryStore::default();
        for garbage in ["{not toml", "tasks = 3", "[timerSettings]\ntimeLeft = -5"] {
            store.set(STATE_KEY, garbage).unwrap();
            assert_eq!(load_state(&store, defaults.clone()), defaults);
        }
    }

    #[test]
    fn test_partial_payload_merges_over_defaults() {
        let defaults = AppState::new(true, 25);
        let content = r#"
darkMode = false
unknownField = "ignored"

[profile]
points = 13
tasksCompleted = 2
"#;
        let state = decode_state(content, defaults.clone()).unwrap();

        assert!(!state.dark_mode);
        assert_eq!(state.profile.points, 13);
        assert_eq!(state.profile.tasks_completed, 2);
        assert_eq!(state.profile.high_priority_completed, 0);
        assert_eq!(state.timer_settings, defaults.timer_settings);
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn test_malformed_task_is_skipped() {
        let content = r#"
darkMode = false

[profile]
points = 50

[[tasks]]
title = "No id"
priority = "high"

[[tasks]]
id = "b2"
title = "Kept"
priority = "low"
pointsAwarded = true
"#;
        let state = decode_state(content, AppState::default()).unwrap();

        assert!(!state.dark_mode);
        assert_eq!(state.profile.points, 50);
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].id, "b2");
        assert_eq!(state.tasks[0].priority, Priority::Low);
        assert!(state.tasks[0].points_awarded);
    }

    #[test]
    fn test_older_field_names_accepted() {
        let content = r#"
[timerSettings]
duration = 15
timeLeft = 600
isRunning = false

[[tasks]]
id = "a1"
title = "Legacy"
priority = "medium"
completed = true
"#;
        let state = decode_state(content, AppState::default()).unwrap();

        assert_eq!(
            state.timer_settings,
            TimerSettings {
                duration_minutes: 15,
                is_running: false,
                time_left_seconds: 600,
            }
        );
        assert_eq!(state.tasks.len(), 1);
        assert!(state.tasks[0].completed);
        assert!(!state.tasks[0].points_awarded);
    }

    #[test]
    fn test_duration_only_resets_time_left() {
        let content = "[timerSettings]\ndurationMinutes = 15\n";
        let state = decode_state(content, AppState::default()).unwrap();
        assert_eq!(state.timer_settings, TimerSettings::with_duration(15));
    }

    #[test]
    fn test_theme_override_values() {
        let mut store = MemoryStore::default();
        assert_eq!(load_theme_override(&store), None);

        save_theme_override(&mut store, Some(true)).unwrap();
        assert_eq!(load_theme_override(&store), Some(true));
        save_theme_override(&mut store, Some(false)).unwrap();
        assert_eq!(load_theme_override(&store), Some(false));

        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(load_theme_override(&store), None);

        save_theme_override(&mut store, None).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get(STATE_KEY).unwrap(), None);
        store.set(STATE_KEY, "darkMode = true\n").unwrap();
        assert_eq!(
            store.get(STATE_KEY).unwrap().as_deref(),
            Some("darkMode = true\n")
        );

        store.remove(STATE_KEY).unwrap();
        store.remove(STATE_KEY).unwrap();
        assert_eq!(store.get(STATE_KEY).unwrap(), None);

        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state();
        let mut store = FileStore::new(dir.path().to_path_buf());
        save_state(&mut store, &state).unwrap();

        let reopened = FileStore::new(dir.path().to_path_buf());
        assert_eq!(load_state(&reopened, AppState::default()), state);
    }

    #[test]
    fn test_persistence_observer_writes_snapshot() {
        let mut store = Store::new(AppState::new(false, 25), None);
        store.dispatch(Intent::AddTask {
            title: "Write report".to_string(),
            priority: Priority::High,
        });
        store.dispatch(Intent::ToggleDarkMode);

        let mut persistence = Persistence::new(MemoryStore::default(), None);
        persistence.state_changed(Snapshot {
            state: store.state(),
            theme_override: store.theme_override(),
        });

        let saved = load_state(persistence.inner(), AppState::default());
        assert_eq!(&saved, store.state());
        assert_eq!(load_theme_override(persistence.inner()), Some(true));
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(StorageError::Read {
                path: PathBuf::from("broken"),
                source: io::Error::other("unavailable"),
            })
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(StorageError::Write {
                path: PathBuf::from("broken"),
                source: io::Error::other("disk full"),
            })
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.set(key, "")
        }
    }

    #[test]
    fn test_storage_failures_do_not_block_transitions() {
        let defaults = AppState::new(false, 25);
        assert_eq!(load_state(&BrokenStore, defaults.clone()), defaults);
        assert_eq!(load_theme_override(&BrokenStore), None);

        let mut store = Store::new(defaults, None);
        store.subscribe(Box::new(Persistence::new(BrokenStore, None)));
        store.dispatch(Intent::AddTask {
            title: "still works".to_string(),
            priority: Priority::Medium,
        });
        store.dispatch(Intent::ToggleDarkMode);

        assert_eq!(store.state().tasks.len(), 1);
        assert!(store.state().dark_mode);
    }
}
