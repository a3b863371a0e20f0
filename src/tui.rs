use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::models::{Job, JobStatus};
use crate::store::{DataStore, JobFilters};

struct AppState {
    job_ids: Vec<String>,
    selected: usize,
    scroll_offset: u16,
    message: Option<String>,
}

impl AppState {
    fn new(job_ids: Vec<String>) -> Self {
        Self {
            job_ids,
            selected: 0,
            scroll_offset: 0,
            message: None,
        }
    }

    fn current_id(&self) -> Option<&str> {
        self.job_ids.get(self.selected).map(String::as_str)
    }

    fn next(&mut self) {
        if !self.job_ids.is_empty() && self.selected < self.job_ids.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

pub fn run_browse(store: &mut DataStore, query: &str, filters: &JobFilters) -> Result<()> {
    let job_ids: Vec<String> = store
        .search_jobs(query, filters)
        .into_iter()
        .map(|j| j.id.clone())
        .collect();
    if job_ids.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    let mut state = AppState::new(job_ids);
    if let Some(id) = state.current_id().map(str::to_string) {
        store.record_job_view(&id);
    }

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, store);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    store: &mut DataStore,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, store, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let prev_selected = state.selected;
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('s') => {
                    if let Some(id) = state.current_id().map(str::to_string) {
                        state.message = Some(toggle_saved(store, &id));
                    }
                }
                KeyCode::Char('a') => {
                    if let Some(id) = state.current_id().map(str::to_string) {
                        state.message = Some(apply(store, &id));
                    }
                }
                _ => {}
            }
            if state.selected != prev_selected {
                list_state.select(Some(state.selected));
                state.message = None;
                if let Some(id) = state.current_id().map(str::to_string) {
                    store.record_job_view(&id);
                }
            }
        }
    }
    Ok(())
}

fn toggle_saved(store: &mut DataStore, job_id: &str) -> String {
    let result = if store.is_job_saved(job_id) {
        store.unsave_job(job_id).map(|_| "Removed from saved jobs")
    } else {
        store.save_job(job_id).map(|_| "Saved")
    };
    match result {
        Ok(msg) => msg.to_string(),
        Err(e) => e.to_string(),
    }
}

fn apply(store: &mut DataStore, job_id: &str) -> String {
    match store.apply_to_job(job_id, None) {
        Ok(app) => format!("Applied ({})", app.id),
        Err(e) => e.to_string(),
    }
}

fn list_marker(store: &DataStore, job: &Job) -> &'static str {
    if store.has_applied(&job.id) {
        "+"
    } else if store.is_job_saved(&job.id) {
        "*"
    } else if job.status != JobStatus::Active {
        "-"
    } else {
        " "
    }
}

fn draw(frame: &mut Frame, state: &AppState, store: &DataStore, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(65),
        ])
        .split(frame.area());

    // Left panel: job list
    let items: Vec<ListItem> = state
        .job_ids
        .iter()
        .filter_map(|id| store.get_job(id))
        .map(|job| {
            let title = if job.title.chars().count() > 35 {
                format!("{}...", job.title.chars().take(32).collect::<String>())
            } else {
                job.title.clone()
            };
            ListItem::new(format!("{} {} | {}", list_marker(store, job), title, job.company.name))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Jobs ({}) ", state.job_ids.len()
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: job detail
    let detail = build_detail(state, store);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer help
    let help_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let footer = match &state.message {
        Some(msg) => format!(" {}", msg),
        None => " j/k:navigate  J/K:scroll  s:save/unsave  a:apply  q:quit".to_string(),
    };
    let help = Paragraph::new(footer).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area[1]);
}

fn build_detail<'a>(state: &AppState, store: &'a DataStore) -> Text<'a> {
    let Some(job) = state.current_id().and_then(|id| store.get_job(id)) else {
        return Text::raw("No job selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    // Header
    lines.push(Line::from(Span::styled(
        &job.title,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {} · {}", job.company.name, job.location)));

    let status_style = match job.status {
        JobStatus::Active => Style::default().fg(Color::Green),
        JobStatus::Paused => Style::default().fg(Color::Yellow),
        JobStatus::Closed => Style::default().fg(Color::Red),
        JobStatus::Draft => Style::default().fg(Color::DarkGray),
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{}", job.status), status_style),
        Span::raw(format!("  {}", job.job_type)),
    ]));

    if let Some(salary) = &job.salary {
        lines.push(Line::from(format!("Salary: {}", salary)));
    }
    if let Some(department) = &job.department {
        lines.push(Line::from(format!("Department: {}", department)));
    }
    lines.push(Line::from(format!(
        "{} applicants · {} views · posted {}",
        job.application_count,
        job.view_count,
        job.posted_at.format("%Y-%m-%d")
    )));

    let mut flags = Vec::new();
    if store.has_applied(&job.id) {
        flags.push("applied");
    }
    if store.is_job_saved(&job.id) {
        flags.push("saved");
    }
    if !flags.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("[{}]", flags.join(", ")),
            Style::default().fg(Color::Cyan),
        )));
    }
    if !job.tags.is_empty() {
        lines.push(Line::from(Span::styled(
            job.tags.join("  "),
            Style::default().fg(Color::Magenta),
        )));
    }

    lines.push(Line::from(""));
    for line in textwrap::fill(&job.description, 70).lines() {
        lines.push(Line::from(line.to_string()));
    }

    for (heading, items) in [
        ("Requirements", &job.requirements),
        ("Responsibilities", &job.responsibilities),
        ("Benefits", &job.benefits),
    ] {
        if items.is_empty() {
            continue;
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            heading,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for item in items {
            lines.push(Line::from(format!("  - {}", item)));
        }
    }

    if let Some(company) = store.get_company(&job.company.id) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "COMPANY",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(&company.description, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
        if let Some(rating) = company.average_rating() {
            lines.push(Line::from(format!(
                "  Rated {:.1}/5 from {} reviews",
                rating,
                company.reviews.len()
            )));
        }
    }

    Text::from(lines)
}
