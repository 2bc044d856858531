//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件

pub mod components;
pub mod layouts;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph},
};

use super::state::{App, AppMode, ConfirmAction};
use crate::models::{Priority, TimerPhase};
use components::{render_dialog_framework, render_input_widget};
use layouts::centered_rect;
use theme::Palette;

/// 渲染 UI
pub fn render(frame: &mut Frame, app: &App) {
    let palette = Palette::for_mode(app.store.state().dark_mode);
    frame.render_widget(
        Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Min(12),   // 主体
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(9)])
        .split(body[1]);

    render_title(frame, app, &palette, chunks[0]);
    render_tasks(frame, app, &palette, body[0]);
    render_profile(frame, app, &palette, side[0]);
    render_timer(frame, app, &palette, side[1]);
    render_help(frame, app, &palette, chunks[2]);

    // 渲染弹窗
    match &app.mode {
        AppMode::AddingTask => render_add_dialog(frame, app, &palette),
        AppMode::CustomDuration => render_duration_dialog(frame, app, &palette),
        AppMode::Confirm(action) => render_confirm_dialog(frame, action, &palette),
        AppMode::TimerAlert => render_timer_alert(frame, &palette),
        AppMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let theme = if app.store.state().dark_mode {
        "🌙 深色"
    } else {
        "☀ 浅色"
    };
    let line = Line::from(vec![
        Span::styled(
            "⏱ TaskFlow Timer",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("    {}", theme), Style::default().fg(palette.muted)),
    ]);
    let title = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔥",
        Priority::Medium => "⚡",
        Priority::Low => "○",
    }
}

fn render_tasks(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let state = app.store.state();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let progress = Gauge::default()
        .block(Block::default().title("完成进度").borders(Borders::ALL))
        .gauge_style(Style::default().fg(palette.done).bg(palette.bg))
        .ratio(state.completion_ratio())
        .label(format!("{}/{}", state.completed_count(), state.tasks.len()));
    frame.render_widget(progress, chunks[0]);

    let items: Vec<ListItem> = state
        .tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let check = if task.completed { "[✓]" } else { "[ ]" };
            let mut title_style = Style::default().fg(palette.fg);
            if task.completed {
                title_style = title_style
                    .fg(palette.muted)
                    .add_modifier(Modifier::CROSSED_OUT);
            }
            if i == app.selected_index {
                title_style = title_style
                    .fg(palette.selection)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", check), Style::default().fg(palette.done)),
                Span::styled(
                    format!("{} ", priority_icon(task.priority)),
                    Style::default().fg(palette.priority(task.priority)),
                ),
                Span::styled(task.title.clone(), title_style),
            ]))
        })
        .collect();

    let title = if items.is_empty() {
        "任务 (按 'a' 添加第一个任务)"
    } else {
        "任务"
    };
    let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));

    let mut list_state = ListState::default();
    if !state.tasks.is_empty() {
        list_state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn render_profile(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let profile = app.store.state().profile;
    let counter = |priority: Priority| {
        Span::styled(
            format!(
                "{} {}  ",
                priority_icon(priority),
                profile.completed_for(priority)
            ),
            Style::default().fg(palette.priority(priority)),
        )
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("🏆 积分 {}", profile.points),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("已完成任务 {}", profile.tasks_completed)),
        Line::from(""),
        Line::from(vec![
            counter(Priority::High),
            counter(Priority::Medium),
            counter(Priority::Low),
        ]),
    ];

    let widget =
        Paragraph::new(lines).block(Block::default().title("档案").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_timer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let timer = &app.store.state().timer_settings;
    let block = Block::default().title("番茄钟").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // 时间
            Constraint::Length(1), // 进度
            Constraint::Length(2), // 状态
            Constraint::Min(1),    // 预设
        ])
        .split(inner);

    let time = Paragraph::new(timer.format_time_left())
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(time, chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.accent).bg(palette.bg))
        .ratio(timer.progress())
        .label("");
    frame.render_widget(gauge, chunks[1]);

    let (status, color) = match timer.phase() {
        TimerPhase::Idle => ("就绪", palette.muted),
        TimerPhase::Running => ("专注中", palette.done),
        TimerPhase::Paused => ("已暂停", palette.medium),
        TimerPhase::Expired => ("时间到，按 r 重置", palette.warning),
    };
    frame.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color)),
        chunks[2],
    );

    let mut presets: Vec<Span> = app
        .presets
        .iter()
        .enumerate()
        .map(|(i, minutes)| {
            let style = if *minutes == timer.duration_minutes {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(palette.muted)
            };
            Span::styled(format!(" [{}] {}m ", i + 1, minutes), style)
        })
        .collect();
    if !app.presets.contains(&timer.duration_minutes) {
        presets.push(Span::styled(
            format!(" [c] {}m ", timer.duration_minutes),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::REVERSED),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(presets)).alignment(Alignment::Center),
        chunks[3],
    );
}

fn render_help(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => {
            "[a] 添加  [空格] 完成  [d] 删除  [s] 开始/暂停  [r] 重置  [1-9] 预设  [c] 自定义  [t] 主题  [q] 退出"
        }
        AppMode::AddingTask => "[Tab] 切换优先级  [Enter] 添加  [Esc] 取消",
        AppMode::CustomDuration => "[Enter] 确认  [Esc] 取消",
        AppMode::Confirm(_) => "[y] 确认  [n] 取消",
        AppMode::TimerAlert => "[Enter] 知道了",
    };

    let message = app.message.as_deref().unwrap_or("");
    let text = if message.is_empty() {
        help_text.to_string()
    } else {
        format!("{}  |  {}", help_text, message)
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(palette.muted))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_add_dialog(frame: &mut Frame, app: &App, palette: &Palette) {
    let area = centered_rect(60, 40, frame.area());
    let inner = render_dialog_framework(frame, area, "添加任务", palette, palette.accent);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    render_input_widget(frame, chunks[0], "标题", &app.input_buffer, palette);

    let priorities: Vec<Span> = [Priority::High, Priority::Medium, Priority::Low]
        .into_iter()
        .map(|priority| {
            let mut style = Style::default().fg(palette.priority(priority));
            if priority == app.draft_priority {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            Span::styled(
                format!(" {} {} ", priority_icon(priority), priority.label()),
                style,
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(priorities)), chunks[1]);

    frame.render_widget(
        Paragraph::new("输入标题后按 Enter 添加，Tab 切换优先级")
            .style(Style::default().fg(palette.muted)),
        chunks[2],
    );
}

fn render_duration_dialog(frame: &mut Frame, app: &App, palette: &Palette) {
    let area = centered_rect(40, 25, frame.area());
    let inner = render_dialog_framework(frame, area, "自定义时长", palette, palette.accent);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);

    render_input_widget(frame, chunks[0], "分钟", &app.input_buffer, palette);
    frame.render_widget(
        Paragraph::new("按 Enter 确认，Esc 取消").style(Style::default().fg(palette.muted)),
        chunks[1],
    );
}

fn render_confirm_dialog(frame: &mut Frame, action: &ConfirmAction, palette: &Palette) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let message = match action {
        ConfirmAction::Delete(_) => "确认删除该任务？已获得的积分不会扣除。",
    };

    let dialog = Paragraph::new(format!("{}\n\n[y] 确认  [n] 取消", message))
        .style(Style::default().fg(palette.warning).bg(palette.bg))
        .block(Block::default().title("⚠️ 确认操作").borders(Borders::ALL));

    frame.render_widget(dialog, area);
}

fn render_timer_alert(frame: &mut Frame, palette: &Palette) {
    let area = centered_rect(50, 25, frame.area());
    let inner = render_dialog_framework(frame, area, "⏰ 时间到", palette, palette.warning);

    let text = Paragraph::new("该休息一下了！🎉\n\n按 Enter 继续")
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(text, inner);
}
