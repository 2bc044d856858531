//! 宿主终端相关：系统主题偏好与到期提醒

use std::env;
use std::io::{self, Write};

use tracing::debug;

use crate::config::ThemeConfig;

/// 当前系统是否偏好深色主题
///
/// 优先级：配置 > 操作系统外观设置 > `COLORFGBG` > 默认深色。
pub fn prefers_dark(config: &ThemeConfig) -> bool {
    config.prefers_dark.unwrap_or_else(|| {
        os_prefers_dark()
            .or_else(|| {
                env::var("COLORFGBG")
                    .ok()
                    .and_then(|value| parse_colorfgbg(&value))
            })
            .unwrap_or(true)
    })
}

fn os_prefers_dark() -> Option<bool> {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => Some(true),
        Ok(dark_light::Mode::Light) => Some(false),
        Ok(dark_light::Mode::Unspecified) => None,
        Err(e) => {
            debug!(error = %e, "os theme detection failed");
            None
        }
    }
}

/// 解析 `前景;背景`（或 `前景;默认;背景`）格式，背景为暗色时返回 true
pub fn parse_colorfgbg(value: &str) -> Option<bool> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(background, 0..=6 | 8))
}

/// 主题偏好来源，主循环定期采样
pub trait ThemeSource {
    fn prefers_dark(&mut self) -> bool;
}

/// 读取配置与操作系统设置
pub struct SystemTheme {
    config: ThemeConfig,
}

impl SystemTheme {
    pub fn new(config: ThemeConfig) -> Self {
        Self { config }
    }
}

impl ThemeSource for SystemTheme {
    fn prefers_dark(&mut self) -> bool {
        prefers_dark(&self.config)
    }
}

/// 记住上一次采样值，只在偏好变化时报告
pub struct ThemeWatcher {
    source: Box<dyn ThemeSource>,
    last: bool,
}

impl ThemeWatcher {
    pub fn new(mut source: Box<dyn ThemeSource>) -> Self {
        let last = source.prefers_dark();
        Self { source, last }
    }

    pub fn poll(&mut self) -> Option<bool> {
        let current = self.source.prefers_dark();
        if current == self.last {
            return None;
        }
        self.last = current;
        Some(current)
    }
}

/// 计时结束时的提醒
pub trait Notifier {
    fn notify(&mut self) -> io::Result<()>;
}

/// 终端响铃
pub struct TerminalBell;

impl Notifier for TerminalBell {
    fn notify(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }
}
