//! 通用 UI 组件
//!
//! 对话框、输入框等通用组件

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::theme::Palette;

/// [组件] 弹窗基础框架
pub fn render_dialog_framework(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    palette: &Palette,
    border: Color,
) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(border).bg(palette.bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// [组件] 带有标题和样式的输入框
pub fn render_input_widget(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    palette: &Palette,
) {
    let style = Style::default()
        .fg(palette.selection)
        .add_modifier(Modifier::BOLD);

    let input = Paragraph::new(format!("{}_", value))
        .style(style)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(input, area);
}
