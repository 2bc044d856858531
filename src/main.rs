mod config;
mod logging;
mod models;
mod platform;
mod storage;
mod store;
mod ticker;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::{error, info};

use crate::config::{AppConfig, ThemeConfig};
use crate::models::AppState;
use crate::platform::{SystemTheme, TerminalBell, ThemeWatcher};
use crate::storage::{FileStore, Persistence, load_state, load_theme_override};
use crate::store::Store;
use crate::ticker::{TICK_INTERVAL, TimerDriver};
use crate::ui::{App, render};

/// 获取数据目录路径 (~/.local/share/taskflow/)
fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .context("Failed to locate user data directory")?
        .join("taskflow");

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    Ok(data_dir)
}

/// 从存储恢复状态并挂上持久化观察者
fn build_app(config: &AppConfig, data_dir: PathBuf) -> App {
    let kv = FileStore::new(data_dir);
    let defaults = AppState::new(
        platform::prefers_dark(&config.theme),
        config.timer.default_minutes,
    );
    let state = load_state(&kv, defaults);
    let theme_override = load_theme_override(&kv);
    info!(
        tasks = state.tasks.len(),
        points = state.profile.points,
        "state loaded"
    );

    let mut store = Store::new(state, theme_override);
    store.subscribe(Box::new(Persistence::new(kv, theme_override)));

    App::new(
        store,
        config.timer.presets.clone(),
        Box::new(TerminalBell),
    )
}

fn main() -> Result<()> {
    let config = config::load_config().context("Failed to load configuration")?;
    let data_dir = get_data_dir()?;
    logging::init(&data_dir.join("taskflow.log"), &config.logging)?;

    // 崩溃时恢复终端
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let mut app = build_app(&config, data_dir.clone());

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app, &config.theme);

    // 恢复终端
    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "event loop failed");
    }
    info!("shutting down");
    println!("数据已保存到 {}", data_dir.display());

    result
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// 系统主题采样间隔
const THEME_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    theme: &ThemeConfig,
) -> Result<()> {
    let mut driver = TimerDriver::new(TICK_INTERVAL);
    let mut theme_watcher = ThemeWatcher::new(Box::new(SystemTheme::new(theme.clone())));
    let mut theme_checked = Instant::now();

    loop {
        terminal.draw(|f| render(f, app))?;

        let timeout = driver.poll_timeout(Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && ui::handle_key_event(app, key.code) {
                    break;
                }
            }
        }

        let running = app.store.state().timer_settings.is_running;
        for _ in 0..driver.advance(running, Instant::now()) {
            app.tick();
        }

        if theme_checked.elapsed() >= THEME_POLL_INTERVAL {
            theme_checked = Instant::now();
            if let Some(prefers_dark) = theme_watcher.poll() {
                app.system_theme_changed(prefers_dark);
            }
        }
    }
    Ok(())
}
