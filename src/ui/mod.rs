use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, InputMode};
use crate::domain::todo::{ToDo, TodoId};
use crate::timeutil::format_day;

pub fn run<I>(mut app: App<'_, I>, tick_rate: Duration) -> Result<()>
where
    I: Iterator<Item = TodoId>,
{
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();
    let res = loop {
        if let Err(err) = terminal.draw(|f| draw(f, &app)) {
            break Err(err.into());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        let key = match poll_key(timeout) {
            Ok(key) => key,
            Err(err) => break Err(err),
        };
        if let Some(code) = key
            && handle_key(&mut app, code)
        {
            break Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    };

    cleanup_terminal(&mut terminal)?;
    res
}

fn poll_key(timeout: Duration) -> Result<Option<KeyCode>> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key.code));
    }
    Ok(None)
}

/// Returns true when the user asked to quit.
fn handle_key<I>(app: &mut App<'_, I>, code: KeyCode) -> bool
where
    I: Iterator<Item = TodoId>,
{
    match app.mode {
        InputMode::Normal => match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => app.select_next(),
            KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
            KeyCode::Char('a') | KeyCode::Char('n') => app.start_adding(),
            KeyCode::Char('e') => app.start_editing(),
            KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('t') => app.toggle_all(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('X') => app.delete_all(),
            KeyCode::Char('f') => app.cycle_view(),
            KeyCode::Char('r') => {
                app.reload();
                app.set_status("Reloaded");
            }
            _ => {}
        },
        InputMode::Adding | InputMode::Editing(_) => match code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Enter => app.submit_input(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c) => app.input.push(c),
            _ => {}
        },
    }

    false
}

fn draw<I>(f: &mut ratatui::Frame, app: &App<'_, I>)
where
    I: Iterator<Item = TodoId>,
{
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    let header = render_header(app);
    f.render_widget(header, chunks[0]);

    let mut list_state = ListState::default();
    if !app.todos.is_empty() {
        list_state.select(Some(app.selected));
    }

    let list = render_list(&app.todos, app.selected);
    f.render_stateful_widget(list, chunks[1], &mut list_state);

    let footer = render_footer(app);
    f.render_widget(footer, chunks[2]);
}

fn render_header<I>(app: &App<'_, I>) -> Paragraph<'static>
where
    I: Iterator<Item = TodoId>,
{
    let (open, all) = app.totals();
    let summary = format!("Open: {open} / All: {all}");
    let line = Line::from(vec![
        Span::styled("todo-service", Style::default().fg(Color::Cyan)),
        Span::raw("  |  "),
        Span::styled(summary, Style::default().fg(Color::Yellow)),
        Span::raw("  |  "),
        Span::styled(
            format!("View: {}", app.view.label()),
            Style::default().fg(Color::Magenta),
        ),
    ]);
    Paragraph::new(line)
        .block(Block::default().title("Overview").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn render_list(todos: &[ToDo], selected: usize) -> List<'_> {
    let items: Vec<ListItem> = todos
        .iter()
        .enumerate()
        .map(|(idx, todo)| {
            let symbol = if todo.done { "✔" } else { "•" };
            let mut line = vec![
                Span::styled(format!(" #{:<3}", todo.id), Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{symbol} {}", todo.name)),
                Span::styled(
                    format!("  due {}", format_day(todo.due_date)),
                    Style::default().fg(Color::Blue),
                ),
            ];
            if todo.done {
                line.push(Span::styled("  done", Style::default().fg(Color::Green)));
            }

            let style = if idx == selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if todo.done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(line)).style(style)
        })
        .collect();

    List::new(items)
        .block(
            Block::default()
                .title("Todos (j/k move ; a add ; e edit ; Space toggle ; t toggle all ; d delete ; X delete all ; f view)")
                .borders(Borders::ALL),
        )
        .highlight_symbol("➤ ")
}

fn render_footer<'a, I>(app: &'a App<'_, I>) -> Paragraph<'a>
where
    I: Iterator<Item = TodoId>,
{
    let prompt = match app.mode {
        InputMode::Normal => {
            let msg = app
                .status
                .as_deref()
                .unwrap_or("q quit ; a add ; f switch view ; r reload");
            return Paragraph::new(msg).block(Block::default().title("Normal").borders(Borders::ALL));
        }
        InputMode::Adding => "New task: ",
        InputMode::Editing(_) => "Edit task: ",
    };
    let line = Line::from(vec![
        Span::raw(prompt),
        Span::styled(&app.input, Style::default().fg(Color::Yellow)),
        Span::raw("█"),
    ]);
    Paragraph::new(line).block(
        Block::default()
            .title("Input (`name @ YYYY-MM-DD`, Enter to submit / Esc to cancel)")
            .borders(Borders::ALL),
    )
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
