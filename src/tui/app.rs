//! TUI 应用状态和主循环

use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::live::{DashboardSink, LiveMonitor};
use crate::tui::{handle_key, poll_event, render, DashboardView, TuiEvent};

pub type AppResult<T> = Result<T>;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// TUI 应用状态
pub struct App {
    /// 是否退出
    pub should_quit: bool,
    pub monitor: LiveMonitor,
    /// 最近一次发布的快照，界面只读这里
    pub view: DashboardView,
    /// poll 间隔
    pub interval: Duration,
    /// 最近一次 poll 的错误（成功后清空）
    pub last_error: Option<String>,
    /// 最近一次 poll 的时间
    pub last_poll: Option<DateTime<Local>>,
}

impl App {
    pub fn new(monitor: LiveMonitor, interval: Duration) -> Self {
        Self {
            should_quit: false,
            monitor,
            view: DashboardView::new(),
            interval,
            last_error: None,
            last_poll: None,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// 执行一次 poll 并把结果发布到视图；失败只记录，不退出
    pub fn tick(&mut self) {
        match self.monitor.tick() {
            Ok(_) => self.last_error = None,
            Err(e) => {
                warn!(path = %self.monitor.path().display(), "poll failed: {:#}", e);
                self.last_error = Some(format!("{:#}", e));
            }
        }
        self.last_poll = Some(Local::now());
        self.publish();
    }

    fn publish(&mut self) {
        if let Err(e) = self.view.publish(&self.monitor.update()) {
            warn!("failed to publish dashboard update: {:#}", e);
        }
    }

    /// 从头重新读取整个文件
    pub fn rewind(&mut self) {
        self.monitor.rewind();
        self.tick();
    }
}

/// 进入 alternate screen
pub fn init_terminal() -> AppResult<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// 恢复终端
pub fn restore_terminal(terminal: &mut Tui) -> AppResult<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// 主循环：按 interval 触发 poll，期间处理按键
pub fn run(terminal: &mut Tui, app: &mut App) -> AppResult<()> {
    app.tick();
    let mut last_tick = Instant::now();

    while !app.should_quit {
        terminal.draw(|frame| render(&*app, frame))?;

        let timeout = app.interval.saturating_sub(last_tick.elapsed());
        if let Some(TuiEvent::Key(key)) = poll_event(timeout)? {
            handle_key(app, key);
        }

        if last_tick.elapsed() >= app.interval {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
