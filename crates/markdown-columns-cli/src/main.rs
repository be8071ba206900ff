mod view;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_columns_config::Config;
use markdown_columns_engine::parsing::{fix_missing_ids, random_region_id};
use markdown_columns_engine::plain_text::{PlainTextRenderer, TextTarget};
use markdown_columns_engine::{DocumentRegistry, parse_document};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use relative_path::RelativePathBuf;
use std::{
    env, fs,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};
use xi_rope::Rope;

/// Columns lost to the content panel's border.
const PANEL_CHROME: u16 = 2;

/// One region of the open document, in document order.
struct Section {
    key: String,
    start_line: usize,
    error: Option<String>,
}

struct App {
    path: PathBuf,
    doc: RelativePathBuf,
    documents: DocumentRegistry<TextTarget>,
    renderer: PlainTextRenderer,
    sections: Vec<Section>,
    width: u16,
    scroll: u16,
    status: String,
}

impl App {
    fn new(path: PathBuf, doc: RelativePathBuf, config: &Config, width: u16) -> Result<Self> {
        let mut app = Self {
            path,
            doc,
            documents: DocumentRegistry::new(config.layout_options()),
            renderer: PlainTextRenderer::new(),
            sections: Vec::new(),
            width,
            scroll: 0,
            status: String::new(),
        };
        app.reload()?;
        Ok(app)
    }

    /// Re-reads the file and reconciles every region against it.
    fn reload(&mut self) -> Result<()> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let parsed = parse_document(&Rope::from(text.as_str()));

        let width = self.width;
        let registry = self.documents.open_document(&self.doc);
        let synced =
            registry.sync_document(&mut self.renderer, &parsed, || TextTarget::new(width));

        self.sections = synced
            .into_iter()
            .map(|sync| Section {
                error: sync.result.as_ref().err().map(|e| e.user_message()),
                key: sync.key,
                start_line: sync.start_line,
            })
            .collect();
        let rendered = self.documents.refresh_all(&mut self.renderer);
        self.status = format!("{} region(s), {rendered} rendered", self.sections.len());
        log::debug!("reloaded {}: {}", self.doc, self.status);
        Ok(())
    }

    fn resize(&mut self, width: u16) {
        if width == self.width {
            return;
        }
        self.width = width;
        if let Some(registry) = self.documents.document_mut(&self.doc) {
            let keys: Vec<String> = registry.keys().map(str::to_string).collect();
            for key in keys {
                if let Ok(region) = registry.region_mut(&key) {
                    region.target_mut().set_width(width);
                }
            }
        }
        let outcomes = self.documents.refresh_document(&self.doc, &mut self.renderer);
        log::debug!("relaid {} region(s) at width {width}", outcomes.len());
    }

    fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    fn content_lines(&self) -> Vec<Line<'static>> {
        let registry = self.documents.document(&self.doc);
        let mut lines = Vec::new();
        for section in &self.sections {
            let region = registry.and_then(|r| r.region(&section.key));
            match (&section.error, region) {
                (Some(message), _) => lines.extend(view::error_lines(&section.key, message)),
                (None, Some(region)) => {
                    lines.extend(view::region_lines(&section.key, region.target()))
                }
                (None, None) => log::warn!(
                    "region '{}' at line {} has no live entry",
                    section.key,
                    section.start_line + 1
                ),
            }
            lines.push(Line::default());
        }
        if lines.is_empty() {
            lines.push(Line::from("No multi-column regions in this document"));
        }
        lines
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [--fix-ids] <file>");
    eprintln!(
        "Relative paths resolve against notes_path in {}",
        Config::config_path().display()
    );
    process::exit(1);
}

/// Key the document is registered under: its path below `notes_path`, or
/// its file name.
fn document_key(config: &Config, path: &Path) -> RelativePathBuf {
    config
        .notes_path
        .as_deref()
        .and_then(|base| path.strip_prefix(base).ok())
        .or_else(|| path.file_name().map(Path::new))
        .and_then(|p| RelativePathBuf::from_path(p).ok())
        .unwrap_or_else(|| RelativePathBuf::from("document.md"))
}

fn fix_ids(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let fixed = fix_missing_ids(&text, random_region_id);
    if fixed.updated > 0 {
        fs::write(path, &fixed.text).with_context(|| format!("writing {}", path.display()))?;
    }
    println!("Updated {} region(s) in {}", fixed.updated, path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let (fix, file) = match args.as_slice() {
        [_, file] if file != "--fix-ids" => (false, file),
        [_, flag, file] if flag == "--fix-ids" => (true, file),
        _ => usage(&args[0]),
    };

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let path = config.resolve_document(Path::new(file));
    if !path.is_file() {
        eprintln!("Error: '{}' is not a file", path.display());
        process::exit(1);
    }

    if fix {
        return fix_ids(&path);
    }

    let doc = document_key(&config, &path);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let width = terminal.size()?.width.saturating_sub(PANEL_CHROME);
    let res = App::new(path, doc, &config, width)
        .and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        match event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
                KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
                KeyCode::Char('r') => {
                    if let Err(e) = app.reload() {
                        app.status = format!("Reload failed: {e}");
                    }
                }
                _ => {}
            },
            Event::Resize(width, _) => app.resize(width.saturating_sub(PANEL_CHROME)),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let content = Paragraph::new(app.content_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.doc.as_str().to_string()),
        )
        .scroll((app.scroll, 0));
    f.render_widget(content, chunks[0]);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("q: Quit | ↑/k: Up | ↓/j: Down | r: Reload | "),
        Span::styled(app.status.clone(), Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(help, chunks[1]);
}
