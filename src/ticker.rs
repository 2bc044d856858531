//! 计时驱动
//!
//! 把流逝的墙钟时间折算成整数个 tick，余数留到下一次，不会丢秒。

use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub struct TimerDriver {
    interval: Duration,
    anchor: Option<Instant>,
}

impl TimerDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            anchor: None,
        }
    }

    /// 返回自上次调用以来到期的 tick 数
    ///
    /// 计时器从停止变为运行的那一刻作为计数起点。
    pub fn advance(&mut self, running: bool, now: Instant) -> u32 {
        if !running {
            self.anchor = None;
            return 0;
        }
        let Some(anchor) = self.anchor else {
            self.anchor = Some(now);
            return 0;
        };

        let elapsed = now.saturating_duration_since(anchor);
        let due = (elapsed.as_nanos() / self.interval.as_nanos()).min(u128::from(u32::MAX)) as u32;
        self.anchor = Some(anchor + self.interval * due);
        due
    }

    /// 事件循环等待的时长：运行中等到下一个 tick，否则等一个完整间隔
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        match self.anchor {
            Some(anchor) => (anchor + self.interval).saturating_duration_since(now),
            None => self.interval,
        }
    }
}
