//! TUI 渲染模块

use crate::tui::App;
use ratatui::{
    prelude::*,
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
};

/// 状态框高度（含边框）
const STATUS_HEIGHT: u16 = 3;
/// 单个柱子的宽度范围
const MIN_BAR_WIDTH: u16 = 3;
const MAX_BAR_WIDTH: u16 = 9;
const BAR_GAP: u16 = 1;

/// 渲染主界面
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // 垂直分割: 状态栏 | 图表 | 状态 | 底部栏
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // 状态栏
            Constraint::Min(8),                // 图表
            Constraint::Length(STATUS_HEIGHT), // 状态
            Constraint::Length(1),             // 快捷键
        ])
        .split(area);

    render_header(app, frame, vertical[0]);

    // 图表区域: 左右分割
    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // 内存曲线
            Constraint::Percentage(40), // syscall 直方图
        ])
        .split(vertical[1]);

    render_memory_chart(app, frame, charts[0]);
    render_syscall_bars(app, frame, charts[1]);
    render_status(app, frame, vertical[2]);

    let help = " [r] 从头重新读取  [q/Esc] 退出 ";
    let help_bar = Paragraph::new(help).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(help_bar, vertical[3]);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let view = &app.view;
    let polled = app
        .last_poll
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let header = format!(
        " tdash │ {} │ cursor {} B │ tick {} │ {}",
        view.file, view.cursor, view.ticks, polled
    );
    let style = if app.last_error.is_some() {
        Style::default().bg(Color::Red).fg(Color::White)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };
    frame.render_widget(Paragraph::new(header).style(style), area);
}

/// 渲染内存曲线
fn render_memory_chart(app: &App, frame: &mut Frame, area: Rect) {
    let series = &app.view.memory;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" heap (kB) ")
        .border_style(Style::default().fg(Color::Cyan));

    if series.is_empty() {
        let empty = Paragraph::new("no memory samples yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let (x_min, mut x_max) = series.x_bounds().unwrap_or((0.0, 1.0));
    // 只有一个点时给 x 轴留出宽度
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    let y_max = series.y_max().unwrap_or(1.0).max(1.0) * 1.1;

    let datasets = vec![Dataset::default()
        .name("heap (kB)")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(series.points())];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("ts")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(format_axis(x_min)),
                    Span::raw(format_axis(x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(format!("{:.0}", y_max))]),
        );
    frame.render_widget(chart, area);
}

/// 渲染 syscall 直方图
fn render_syscall_bars(app: &App, frame: &mut Frame, area: Rect) {
    let hist = &app.view.syscalls;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" syscalls ({}) ", hist.len()))
        .border_style(Style::default().fg(Color::Yellow));

    if hist.is_empty() {
        let empty = Paragraph::new("no syscall samples yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let data: Vec<(&str, u64)> = hist
        .entries()
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();

    let bars = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(bar_width(area.width.saturating_sub(2), data.len()))
        .bar_gap(BAR_GAP)
        .bar_style(Style::default().fg(Color::Yellow))
        .value_style(Style::default().fg(Color::Black).bg(Color::Yellow));
    frame.render_widget(bars, area);
}

/// 状态框（绿字黑底）
fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let line = match app.last_error {
        Some(ref err) => Line::from(vec![
            Span::styled(app.view.status.as_str(), Style::default().fg(Color::Green)),
            Span::raw("  "),
            Span::styled(format!("⚠ {}", err), Style::default().fg(Color::Red)),
        ]),
        None => Line::from(Span::styled(
            app.view.status.as_str(),
            Style::default().fg(Color::Green),
        )),
    };

    let status = Paragraph::new(line)
        .style(Style::default().bg(Color::Rgb(0x11, 0x11, 0x11)))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" insight "));
    frame.render_widget(status, area);
}

/// 根据可用宽度计算柱宽
pub(crate) fn bar_width(inner_width: u16, bars: usize) -> u16 {
    if bars == 0 {
        return MAX_BAR_WIDTH;
    }
    let per_bar = (inner_width as usize / bars).saturating_sub(BAR_GAP as usize) as u16;
    per_bar.clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
}

fn format_axis(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
