//! TUI 代码查看器演示
//!
//! 使用 crossterm 和 ratatui 驱动 `viewer-core`：终端负责绘制、定时器和滚动，引擎负责
//! 行索引、折叠、搜索、（防抖）高亮和逐字显示动画。
//!
//! # 用法
//!
//! ```bash
//! cargo run -p viewer-tui -- <file_path> [--language <id>] [--config <file.json>] [--reveal]
//! ```
//!
//! 设置 `VIEWER_TUI_LOG=<path>` 把 tracing 日志写入文件（级别由 `RUST_LOG` 控制，默认 `debug`）。
//!
//! # 快捷键
//!
//! - 方向键 / PageUp / PageDown: 滚动
//! - `/`: 查找（Enter 确认，Esc 取消）
//! - n / N: 下一个 / 上一个匹配
//! - Esc: 清除查找；逐字显示时直接显示全文
//! - f: 折叠/展开选中行（未选中时取首个可见行）的区域
//! - z: 开关代码折叠
//! - c / e: 全部折叠 / 全部展开
//! - h: 开关语法高亮
//! - r: 重新播放逐字显示
//! - t: 切换主题
//! - q: 退出
//! - 鼠标左键: 点行号区折叠/展开，点文本选中行

mod config;
mod host;
mod theme;

use config::{ConfigError, TuiConfig};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use host::TerminalHost;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    env, fs,
    io::{self, stdout},
    path::{Path, PathBuf},
    process,
    sync::Mutex,
    time::Duration,
};
use theme::Theme;
use tracing_subscriber::EnvFilter;
use viewer_core::{
    CodeViewer, LanguageId, StyledRun, TextGeometry,
    text::{DEFAULT_TAB_WIDTH, cell_width_at, decimal_digits, visual_x_for_column},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Find,
}

/// 命令行参数
#[derive(Debug, Default)]
struct Args {
    file_path: PathBuf,
    language: Option<String>,
    config_path: Option<PathBuf>,
    reveal: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args::default();
        let mut file_path = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--language" | "-l" => {
                    parsed.language = Some(args.next().ok_or("--language 需要一个参数")?);
                }
                "--config" | "-c" => {
                    parsed.config_path =
                        Some(PathBuf::from(args.next().ok_or("--config 需要一个参数")?));
                }
                "--reveal" => parsed.reveal = true,
                other if other.starts_with('-') => return Err(format!("未知参数: {other}")),
                other => {
                    if file_path.replace(PathBuf::from(other)).is_some() {
                        return Err("只能打开一个文件".to_string());
                    }
                }
            }
        }
        parsed.file_path = file_path.ok_or("缺少文件路径")?;
        Ok(parsed)
    }
}

/// 应用状态
struct App {
    viewer: CodeViewer,
    host: TerminalHost,
    theme: Theme,
    file_path: PathBuf,
    /// 文件全文，用于重新播放逐字显示
    source: String,
    reveal_delay: Duration,
    status_message: String,
    input_mode: InputMode,
    input_buffer: String,
    should_quit: bool,
    /// 上一帧文本区（含边框）的位置，用于鼠标换算
    editor_area: Rect,
}

impl App {
    fn new(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config_path {
            Some(path) => TuiConfig::load(path)?,
            None => TuiConfig::default(),
        };
        let theme = Theme::from_name(&config.theme)
            .ok_or_else(|| ConfigError::UnknownTheme(config.theme.clone()))?;

        if let Some(language) = &args.language {
            config.viewer.language = language.clone();
        } else if let Some(language) = language_for_path(&args.file_path) {
            config.viewer.language = language.name().to_string();
        }
        if args.reveal {
            config.viewer.typing_animation = true;
        }
        let reveal_delay = config.viewer.typing_delay();

        let source = fs::read_to_string(&args.file_path).map_err(|source| ConfigError::Io {
            path: args.file_path.clone(),
            source,
        })?;

        let mut viewer = CodeViewer::new(config.viewer)?;
        let mut host = TerminalHost::new(1);
        viewer.set_code(source.as_str(), &mut host);
        host.sync_layout(&viewer);

        let status_message = match viewer.language() {
            Some(language) => format!("已加载 {} ({})", args.file_path.display(), language.name()),
            None => format!("已加载 {} (无高亮)", args.file_path.display()),
        };

        Ok(Self {
            viewer,
            host,
            theme,
            file_path: args.file_path.clone(),
            source,
            reveal_delay,
            status_message,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            should_quit: false,
            editor_area: Rect::default(),
        })
    }

    /// 处理键盘事件
    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.input_mode != InputMode::Normal {
            self.handle_prompt_key(key);
            return;
        }

        let page = self.host.rows() as isize;
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => self.host.scroll_by(-1),
            KeyCode::Down => self.host.scroll_by(1),
            KeyCode::PageUp => self.host.scroll_by(-page),
            KeyCode::PageDown => self.host.scroll_by(page),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Find;
                self.input_buffer.clear();
            }
            KeyCode::Char('n') => self.find_next(),
            KeyCode::Char('N') => self.find_prev(),
            KeyCode::Esc => {
                if self.viewer.stop_reveal(&mut self.host) {
                    self.status_message = "已跳过动画".to_string();
                } else {
                    self.viewer.clear_search(&mut self.host);
                    self.status_message.clear();
                }
            }
            KeyCode::Char('f') => self.toggle_fold_at_top(),
            KeyCode::Char('z') => {
                let enabled = !self.viewer.config().folding;
                self.viewer.set_folding_enabled(enabled, &mut self.host);
                self.status_message = format!("代码折叠: {}", on_off(enabled));
            }
            KeyCode::Char('c') => {
                self.viewer.collapse_all_folds(&mut self.host);
                self.status_message =
                    format!("已折叠 {} 个区域", self.viewer.folds().regions().len());
            }
            KeyCode::Char('e') => {
                self.viewer.expand_all_folds(&mut self.host);
                self.status_message = "已全部展开".to_string();
            }
            KeyCode::Char('h') => {
                let enabled = !self.viewer.config().highlighting;
                self.viewer.set_highlighting_enabled(enabled, &mut self.host);
                self.status_message = format!("语法高亮: {}", on_off(enabled));
            }
            KeyCode::Char('r') => {
                self.viewer
                    .start_reveal(self.source.as_str(), self.reveal_delay, &mut self.host);
                self.status_message = "逐字显示中… (Esc 跳过)".to_string();
            }
            KeyCode::Char('t') => {
                self.theme = self.theme.next();
                self.status_message = format!("主题: {}", self.theme.name());
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.status_message = "已取消".to_string();
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let query = std::mem::take(&mut self.input_buffer);
                let count = self.viewer.search(&query, &mut self.host);
                self.status_message = if query.is_empty() {
                    String::new()
                } else if count == 0 {
                    format!("未找到: {query}")
                } else {
                    self.match_status()
                };
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn find_next(&mut self) {
        if self.viewer.find_next(&mut self.host) {
            self.status_message = self.match_status();
        }
    }

    fn find_prev(&mut self) {
        if self.viewer.find_previous(&mut self.host) {
            self.status_message = self.match_status();
        }
    }

    fn match_status(&self) -> String {
        let Some(state) = self.viewer.search_state() else {
            return String::new();
        };
        let current = state.current_index().map_or(0, |i| i + 1);
        format!("“{}”: {}/{}", state.query(), current, state.match_count())
    }

    fn toggle_fold_at_top(&mut self) {
        let top = self.host.top_line();
        let line = self.viewer.selected_line().unwrap_or(top);
        if self.viewer.toggle_fold(line, &mut self.host) {
            self.status_message = format!("已切换第 {} 行的折叠", line + 1);
        } else {
            self.status_message = format!("第 {} 行没有可折叠区域", line + 1);
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.host.scroll_by(-3),
            MouseEventKind::ScrollDown => self.host.scroll_by(3),
            MouseEventKind::Up(MouseButton::Left) => {
                let inner = inner_rect(self.editor_area);
                if !contains(inner, mouse.column, mouse.row) {
                    return;
                }
                // 取格子中心，避免落在边界上
                let x = (mouse.column - inner.x) as f32 + 0.5;
                let y = (mouse.row - inner.y) as f32 + 0.5;
                let geometry = self.geometry();
                let hit = self.viewer.pointer_up(x, y, &geometry, &mut self.host);
                tracing::debug!(?hit, "pointer up");
                self.status_message = format!("第 {} 行", hit.line() + 1);
            }
            _ => {}
        }
    }

    fn geometry(&self) -> TextGeometry {
        TextGeometry::new(1.0).with_gutter(self.viewer.gutter_width(1.0))
    }

    /// 处理到期定时器并同步布局
    fn tick(&mut self) {
        self.host.fire_due(&mut self.viewer);
        self.host.sync_layout(&self.viewer);
        self.host.apply_pending_scroll(&self.viewer);
    }

    /// 渲染界面
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.editor_area = chunks[0];
        self.host
            .set_rows(inner_rect(chunks[0]).height as usize);

        self.render_editor(frame, chunks[0]);
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            " {} [{}] ",
            self.file_path.display(),
            self.viewer.language().map_or("plain", LanguageId::name)
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(self.theme.text());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = inner.height as usize;
        let gutter_cols = self.viewer.gutter_width(1.0) as usize;
        let runs = self.viewer.styled_runs();
        let search = self.viewer.search_highlight();
        let index = self.viewer.line_index();
        let folds = self.viewer.folds();

        let mut display_lines = Vec::with_capacity(rows);
        let mut line = self.host.top_line();
        let mut cursor_row = None;
        let reveal_line = self
            .viewer
            .reveal_cursor()
            .map(|offset| index.line_for_offset(offset));

        while display_lines.len() < rows && line < index.line_count() {
            if folds.is_line_hidden(line) {
                line += 1;
                continue;
            }
            let range = index.line_range(line);
            let text: String = self
                .viewer
                .text()
                .chars()
                .skip(range.start)
                .take(range.len())
                .collect();

            let mut spans = Vec::new();
            if gutter_cols > 0 {
                spans.push(Span::styled(
                    self.gutter_label(line, gutter_cols),
                    self.theme.gutter(),
                ));
            }
            spans.extend(self.text_spans(&text, range.start, &runs, search.as_ref()));

            let mut rendered = Line::from(spans);
            if self.viewer.highlighted_line() == Some(line) {
                rendered = rendered.style(Style::default().bg(self.theme.current_line_bg()));
            }
            if reveal_line == Some(line) {
                cursor_row = Some((display_lines.len(), text));
            }
            display_lines.push(rendered);
            line += 1;
        }

        let paragraph = Paragraph::new(display_lines).style(self.theme.text());
        frame.render_widget(paragraph, inner);

        // 逐字显示时把终端光标放在已显示文本末尾
        if let Some((row, text)) = cursor_row {
            let x = gutter_cols + visual_x_for_column(&text, text.chars().count(), DEFAULT_TAB_WIDTH);
            let x = (inner.x as usize + x).min((inner.x + inner.width.saturating_sub(1)) as usize);
            frame.set_cursor_position((x as u16, inner.y + row as u16));
        }
    }

    fn gutter_label(&self, line: usize, gutter_cols: usize) -> String {
        let digits = decimal_digits(self.viewer.line_index().line_count());
        let pad = gutter_cols.saturating_sub(digits);
        let marker = match self.viewer.folds().region_starting_at(line) {
            Some(region) if region.is_collapsed => '▸',
            Some(_) => '▾',
            None => ' ',
        };
        let left = pad / 2;
        let right = pad - left;
        let mut label = String::with_capacity(gutter_cols + 2);
        if left > 0 {
            label.push(marker);
            label.extend(std::iter::repeat_n(' ', left - 1));
        }
        label.push_str(&format!("{:>digits$}", line + 1));
        label.extend(std::iter::repeat_n(' ', right));
        label
    }

    /// 按高亮 run 和搜索区间把一行切成若干 span；tab 展开为空格
    fn text_spans(
        &self,
        text: &str,
        line_start: usize,
        runs: &[StyledRun],
        search: Option<&std::ops::Range<usize>>,
    ) -> Vec<Span<'static>> {
        let mut out: Vec<Span<'static>> = Vec::new();
        let mut current = String::new();
        let mut current_style = self.theme.text();
        let mut run_idx = runs.partition_point(|run| run.end <= line_start);
        let mut cell = 0;

        for (column, ch) in text.chars().enumerate() {
            let offset = line_start + column;
            while run_idx < runs.len() && runs[run_idx].end <= offset {
                run_idx += 1;
            }
            let mut style = match runs.get(run_idx) {
                Some(run) if run.start <= offset => self.theme.category(run.category),
                _ => self.theme.text(),
            };
            if search.is_some_and(|r| r.contains(&offset)) {
                style = style
                    .bg(self.theme.search_bg())
                    .add_modifier(Modifier::UNDERLINED);
            }

            if style != current_style && !current.is_empty() {
                out.push(Span::styled(std::mem::take(&mut current), current_style));
            }
            current_style = style;

            let width = cell_width_at(ch, cell, DEFAULT_TAB_WIDTH);
            if ch == '\t' {
                current.extend(std::iter::repeat_n(' ', width));
            } else {
                current.push(ch);
            }
            cell += width;
        }
        if !current.is_empty() {
            out.push(Span::styled(current, current_style));
        }
        out
    }

    /// 渲染状态行
    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let status_text = if self.input_mode == InputMode::Find {
            format!("Find > {}  (Enter=查找, Esc=取消)", self.input_buffer)
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let index = self.viewer.line_index();
            // visible_line_range 的 last 是视口下边缘那一行；这里显示屏幕上实际画出的首末行
            format!(
                "行:{}-{} | 总行数:{} 字符数:{} | 折叠:{} | 高亮:{}{} | 主题:{} | 版本:{}",
                self.host.top_line() + 1,
                self.host.bottom_line() + 1,
                index.line_count(),
                index.char_count(),
                self.viewer.folds().regions().len(),
                on_off(self.viewer.config().highlighting),
                if self.viewer.is_highlight_pending() {
                    "…"
                } else {
                    ""
                },
                self.theme.name(),
                self.viewer.version()
            )
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        frame.render_widget(status_line, area);
    }

    /// 渲染快捷键提示
    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = "q:退出  /:查找  n/N:下一个/上一个  Esc:清除  f:折叠  z:开关折叠  c/e:全部折叠/展开  h:高亮  r:动画  t:主题";
        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));

        frame.render_widget(shortcuts_line, area);
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "开" } else { "关" }
}

fn language_for_path(path: &Path) -> Option<LanguageId> {
    let ext = path.extension()?.to_str()?;
    LanguageId::from_extension(ext)
}

fn inner_rect(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

/// 日志写入文件；未设置 `VIEWER_TUI_LOG` 时不输出（终端被界面占用）
fn init_logging() -> io::Result<()> {
    let Ok(path) = env::var("VIEWER_TUI_LOG") else {
        return Ok(());
    };
    let file = fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    // 获取命令行参数
    let program = env::args().next().unwrap_or_else(|| "viewer-tui".to_string());
    let args = match Args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!(
                "用法: {program} <file_path> [--language <id>] [--config <file.json>] [--reveal]"
            );
            eprintln!("\n示例:");
            eprintln!("  {program} Main.java --reveal");
            process::exit(1);
        }
    };

    init_logging()?;

    // 先创建应用，配置错误不需要恢复终端
    let mut app = match App::new(&args) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("错误: {err}");
            process::exit(1);
        }
    };

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);
    app.viewer.detach(&mut app.host);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("错误: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let mut dirty = true;
    loop {
        app.tick();
        if app.host.take_redraw() || dirty {
            terminal.draw(|f| app.render(f))?;
        }

        if app.should_quit {
            break;
        }

        // 处理事件；有定时器时只等到下一个到期点
        dirty = false;
        if event::poll(app.host.poll_timeout())? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                Event::Resize(_, _) => {
                    // 重新渲染
                }
                _ => {}
            }
            dirty = true;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_args_parse() {
        let parsed = args(&["Main.kt", "--language", "kotlin", "--reveal"]).unwrap();
        assert_eq!(parsed.file_path, PathBuf::from("Main.kt"));
        assert_eq!(parsed.language.as_deref(), Some("kotlin"));
        assert!(parsed.reveal);
        assert!(parsed.config_path.is_none());
    }

    #[test]
    fn test_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.java", "b.java"]).is_err());
        assert!(args(&["a.java", "--theme"]).is_err());
        assert!(args(&["a.java", "--config"]).is_err());
    }

    #[test]
    fn test_language_for_path() {
        assert_eq!(
            language_for_path(Path::new("src/App.kt")),
            Some(LanguageId::Kotlin)
        );
        assert_eq!(language_for_path(Path::new("README")), None);
    }
}
