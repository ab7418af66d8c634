use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use ktube::app::{App, AppScreen, SettingsField, StatusKind, StudyFocus, mode_label};
use ktube::config::Config;
use ktube::engine::evaluate::ExerciseMode;
use ktube::event::{AppEvent, EventHandler};
use ktube::ui;
use ktube::ui::components::dictionary_panel::DictionaryPanel;
use ktube::ui::components::history_table::HistoryTable;
use ktube::ui::components::input_field::InputField;
use ktube::ui::components::progress_bar::ProgressBar;
use ktube::ui::components::study_panel::StudyPanel;
use ktube::ui::components::video_list::VideoList;
use ktube::ui::components::vocabulary_table::VocabularyTable;
use ktube::ui::layout::{AppLayout, StudyLayout, pack_hint_lines};
use ktube::ui::line_input::{InputResult, LineInput};

rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(name = "ktube", version, about = "Korean dictation practice on YouTube subtitles")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Interface and dictionary language (en, ko, ja, ...)")]
    lang: Option<String>,

    #[arg(short, long, help = "Exercise mode (blank, full)")]
    mode: Option<String>,

    #[arg(short, long, help = "Shuffle segment order")]
    shuffle: bool,

    #[arg(short, long, help = "Search for videos on startup")]
    query: Option<String>,
}

fn init_logging() -> Result<()> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ktube");
    fs::create_dir_all(&dir)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("ktube.log"))?;
    // The terminal is in raw mode, so log lines go to a file.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_logging() {
        eprintln!("logging disabled: {err:#}");
    }

    let mut config = Config::load();
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(lang) = cli.lang {
        config.ui_lang = lang;
    }
    if let Some(mode) = cli.mode.as_deref() {
        match ExerciseMode::from_name(mode) {
            Some(mode) => config.exercise_mode = mode,
            None => eprintln!("unknown mode {mode:?}, keeping {}", config.exercise_mode.as_str()),
        }
    }
    if cli.shuffle {
        config.shuffle = true;
    }
    config.validate();
    log::info!("starting ktube (lang {}, mode {})", config.ui_lang, config.exercise_mode.as_str());

    let mut app = App::new(config);
    if let Some(query) = cli.query {
        app.search_input.set(&query);
        app.run_search();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("fatal: {err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        app.prepare_blanks();
        app.refresh_playback();
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => handle_paste(app, &text),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.settings_editing.is_none() {
        match key.code {
            KeyCode::F(2) => return app.go_to(AppScreen::History),
            KeyCode::F(3) => return app.go_to(AppScreen::Vocabulary),
            KeyCode::F(4) => return app.go_to(AppScreen::Settings),
            _ => {}
        }
    }

    match app.screen {
        AppScreen::Search => handle_search_key(app, key),
        AppScreen::Study => handle_study_key(app, key),
        AppScreen::Complete => handle_complete_key(app, key),
        AppScreen::History => handle_history_key(app, key),
        AppScreen::Vocabulary => handle_vocabulary_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_paste(app: &mut App, text: &str) {
    let target: Option<&mut LineInput> = match app.screen {
        AppScreen::Search => Some(&mut app.search_input),
        AppScreen::Study => Some(match app.study_focus {
            StudyFocus::Answer => &mut app.answer_input,
            StudyFocus::Lookup => &mut app.lookup_input,
        }),
        AppScreen::Settings => app.settings_editing.as_mut(),
        _ => None,
    };
    if let Some(input) = target {
        input.insert_str(text);
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match app.search_input.handle(key) {
        InputResult::Submit => app.search_enter(),
        InputResult::Cancel => {
            if app.search_input.is_empty() {
                app.should_quit = true;
            } else {
                app.search_input.clear();
            }
        }
        InputResult::Continue => {}
        InputResult::Ignored => match key.code {
            KeyCode::Down => app.search_select_next(),
            KeyCode::Up => app.search_select_prev(),
            _ => {}
        },
    }
}

fn handle_study_key(app: &mut App, key: KeyEvent) {
    let focus = app.study_focus;
    let input = match focus {
        StudyFocus::Answer => &mut app.answer_input,
        StudyFocus::Lookup => &mut app.lookup_input,
    };
    match input.handle(key) {
        InputResult::Submit => match focus {
            StudyFocus::Answer => app.submit_answer(),
            StudyFocus::Lookup => app.lookup_manual(),
        },
        InputResult::Cancel => app.leave_session(),
        InputResult::Continue => {}
        InputResult::Ignored => handle_study_command(app, key),
    }
}

fn handle_study_command(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Tab | KeyCode::BackTab => app.toggle_study_focus(),
        KeyCode::PageDown => app.next_segment(),
        KeyCode::PageUp => app.prev_segment(),
        KeyCode::Down => app.dictionary_select_next(),
        KeyCode::Up => app.dictionary_select_prev(),
        KeyCode::Char('n') if ctrl => app.next_segment(),
        KeyCode::Char('p') if ctrl => app.prev_segment(),
        KeyCode::Char('r') if ctrl => app.replay_segment(),
        KeyCode::Char('o') if ctrl => app.open_playback(),
        KeyCode::Char('t') if ctrl => app.toggle_mode(),
        KeyCode::Char('s') if ctrl => app.save_selected_word(),
        _ => {}
    }
}

fn handle_complete_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.restart_session(),
        KeyCode::Char('h') => app.go_to(AppScreen::History),
        KeyCode::Char('v') => app.go_to(AppScreen::Vocabulary),
        KeyCode::Char('q') | KeyCode::Esc => app.leave_session(),
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_back(),
        KeyCode::Char('j') | KeyCode::Down => app.history_select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.history_select_prev(),
        KeyCode::Char('e') => app.export_history(),
        _ => {}
    }
}

fn handle_vocabulary_key(app: &mut App, key: KeyEvent) {
    if app.vocabulary_confirm_clear {
        match key.code {
            KeyCode::Char('y') => app.clear_vocabulary(),
            KeyCode::Char('n') | KeyCode::Esc => app.vocabulary_confirm_clear = false,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_back(),
        KeyCode::Char('j') | KeyCode::Down => app.vocabulary_select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.vocabulary_select_prev(),
        KeyCode::Char('e') => app.export_vocabulary(),
        KeyCode::Char('x') | KeyCode::Delete => {
            if !app.vocabulary.is_empty() {
                app.vocabulary_confirm_clear = true;
            }
        }
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    if let Some(input) = app.settings_editing.as_mut() {
        match input.handle(key) {
            InputResult::Submit => app.settings_commit_edit(),
            InputResult::Cancel => app.settings_cancel_edit(),
            InputResult::Continue | InputResult::Ignored => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.save_settings();
            app.go_back();
        }
        KeyCode::Up | KeyCode::Char('k') => app.settings_select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_select_next(),
        KeyCode::Enter => app.settings_activate(),
        KeyCode::Right | KeyCode::Char('l') => app.settings_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle(false),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()).fg(colors.fg()));
    frame.render_widget(bg, area);

    let hints = footer_hints(app);
    let hint_refs: Vec<&str> = hints.iter().map(String::as_str).collect();
    let hint_lines = pack_hint_lines(&hint_refs, area.width as usize);
    let layout = AppLayout::new(area, hint_lines.len() as u16);

    render_header(frame, app, layout.header);

    match app.screen {
        AppScreen::Search => render_search(frame, app, layout.main),
        AppScreen::Study => render_study(frame, app, &layout),
        AppScreen::Complete => render_complete(frame, app, layout.main),
        AppScreen::History => {
            frame.render_widget(HistoryTable::new(&app.ledger, app.history_selected, app.theme), layout.main);
        }
        AppScreen::Vocabulary => {
            let table = VocabularyTable::new(
                &app.vocabulary,
                app.vocabulary_selected,
                app.vocabulary_confirm_clear,
                app.theme,
            );
            frame.render_widget(table, layout.main);
        }
        AppScreen::Settings => render_settings(frame, app, layout.main),
    }

    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => colors.accent(),
            StatusKind::Success => colors.success(),
            StatusKind::Error => colors.error(),
        };
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color),
        )));
        frame.render_widget(line, layout.status);
    }

    let footer: Vec<Line> = hint_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(footer), layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let context = match (app.screen, app.session.as_ref()) {
        (AppScreen::Study | AppScreen::Complete, Some(session)) => session.video().title.clone(),
        (AppScreen::History, _) => t!("history.title").to_string(),
        (AppScreen::Vocabulary, _) => t!("vocabulary.title").to_string(),
        (AppScreen::Settings, _) => t!("settings.title").to_string(),
        _ => t!("search.title").to_string(),
    };
    let info = format!(
        " {context} | {} | {}",
        mode_label(app.config.exercise_mode),
        t!(
            "header.accuracy",
            accuracy = format!("{:.0}", app.ledger.accuracy()),
            total = app.ledger.len()
        )
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " ktube ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(info, Style::default().fg(colors.muted()).bg(colors.header_bg())),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn footer_hints(app: &App) -> Vec<String> {
    let keys: &[&str] = match app.screen {
        AppScreen::Search => &["hints.search", "hints.select", "hints.global", "hints.quit"],
        AppScreen::Study => &[
            "hints.submit",
            "hints.navigate",
            "hints.replay",
            "hints.open",
            "hints.toggle_mode",
            "hints.focus",
            "hints.save_word",
            "hints.back",
        ],
        AppScreen::Complete => &["hints.restart", "hints.history", "hints.vocabulary", "hints.back"],
        AppScreen::History => &["hints.scroll", "hints.export", "hints.back"],
        AppScreen::Vocabulary => &["hints.scroll", "hints.export", "hints.clear", "hints.back"],
        AppScreen::Settings => &["hints.settings_change", "hints.settings_edit", "hints.settings_save"],
    };
    keys.iter().map(|key| hint_text(key)).collect()
}

fn hint_text(key: &str) -> String {
    let hint = match key {
        "hints.search" => t!("hints.search"),
        "hints.select" => t!("hints.select"),
        "hints.global" => t!("hints.global"),
        "hints.quit" => t!("hints.quit"),
        "hints.submit" => t!("hints.submit"),
        "hints.navigate" => t!("hints.navigate"),
        "hints.replay" => t!("hints.replay"),
        "hints.open" => t!("hints.open"),
        "hints.toggle_mode" => t!("hints.toggle_mode"),
        "hints.focus" => t!("hints.focus"),
        "hints.save_word" => t!("hints.save_word"),
        "hints.back" => t!("hints.back"),
        "hints.restart" => t!("hints.restart"),
        "hints.history" => t!("hints.history"),
        "hints.vocabulary" => t!("hints.vocabulary"),
        "hints.scroll" => t!("hints.scroll"),
        "hints.export" => t!("hints.export"),
        "hints.clear" => t!("hints.clear"),
        "hints.settings_change" => t!("hints.settings_change"),
        "hints.settings_edit" => t!("hints.settings_edit"),
        _ => t!("hints.settings_save"),
    };
    hint.to_string()
}

fn render_search(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    frame.render_widget(
        InputField::new(t!("search.input_title"), &app.search_input, true, app.theme),
        layout[0],
    );
    place_cursor(frame, &app.search_input, layout[0]);
    frame.render_widget(
        VideoList::new(&app.search_results, app.search_selected, app.theme),
        layout[1],
    );
}

fn render_study(frame: &mut ratatui::Frame, app: &App, app_layout: &AppLayout) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let layout = StudyLayout::new(app_layout.main, app_layout.tier);

    let position = session.current_index().map_or(session.segments().len(), |i| i + 1);
    frame.render_widget(
        ProgressBar::new(position, session.segments().len(), app.theme),
        layout.progress,
    );
    frame.render_widget(
        StudyPanel::new(session, app.config.exercise_mode, app.playback.as_ref(), app.theme),
        layout.panel,
    );

    let answer_title = match app.config.exercise_mode {
        ExerciseMode::Blank => t!("study.answer_blank"),
        ExerciseMode::Full => t!("study.answer_full"),
    };
    let answer_focused = app.study_focus == StudyFocus::Answer;
    frame.render_widget(
        InputField::new(answer_title, &app.answer_input, answer_focused, app.theme),
        layout.answer,
    );
    frame.render_widget(
        InputField::new(t!("study.lookup_title"), &app.lookup_input, !answer_focused, app.theme),
        layout.lookup,
    );
    frame.render_widget(
        DictionaryPanel::new(&app.dictionary_results, app.dictionary_selected, app.theme),
        layout.dictionary,
    );

    if answer_focused {
        place_cursor(frame, &app.answer_input, layout.answer);
    } else {
        place_cursor(frame, &app.lookup_input, layout.lookup);
    }
}

/// The hardware cursor marks where an IME draws its preedit text.
fn place_cursor(frame: &mut ratatui::Frame, input: &LineInput, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let max = area.width - 2;
    let column = input.cursor_columns().min(max - 1);
    frame.set_cursor_position((area.x + 1 + column, area.y + 1));
}

fn render_complete(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let centered = ui::layout::centered_rect(50, 50, area);

    let Some(session) = app.session.as_ref() else {
        return;
    };
    let title = session.video().title.clone();
    let attempts: Vec<_> = app
        .ledger
        .records()
        .iter()
        .filter(|r| r.video_title == title)
        .collect();
    let correct = attempts.iter().filter(|r| r.correct).count();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            t!("complete.title").to_string(),
            Style::default()
                .fg(colors.success())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(title, Style::default().fg(colors.fg()))),
        Line::from(Span::styled(
            t!(
                "complete.summary",
                segments = session.segments().len(),
                attempts = attempts.len(),
                correct = correct
            )
            .to_string(),
            Style::default().fg(colors.muted()),
        )),
    ];
    let block = Block::bordered()
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        centered,
    );
}

fn render_settings(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let centered = ui::layout::centered_rect(60, 90, area);

    let block = Block::bordered()
        .title(format!(" {} ", t!("settings.title")))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = SettingsField::ALL;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(fields.len() as u16 * 2),
            Constraint::Min(0),
        ])
        .split(inner);

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(2)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.blank()
        } else {
            colors.muted()
        });

        let value_text = match (&app.settings_editing, is_selected) {
            (Some(input), true) => format!("     {}▏", input.value()),
            _ if field.is_text() => format!("     {}", app.setting_value(*field)),
            _ => format!("     < {} >", app.setting_value(*field)),
        };
        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{}", field.label()), label_style)),
            Line::from(Span::styled(value_text, value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }
}
