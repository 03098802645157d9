//! Main meal view
//!
//! Renders the current day's header, the window strip of nearby dates, the
//! menu with ratings and favorite markers, the rating summary, and the
//! status and key-hint lines.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::report::{format_korean_date, format_short_date, NO_MEAL_MESSAGE};
use crate::stats::format_average;

/// Renders the main view
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Date header
            Constraint::Length(3), // Window strip
            Constraint::Min(5),    // Menu
            Constraint::Length(4), // Summary
            Constraint::Length(1), // Status
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_strip(frame, app, chunks[1]);
    render_menu(frame, app, chunks[2]);
    render_summary(frame, app, chunks[3]);
    render_status(frame, app, chunks[4]);
    render_hints(frame, chunks[5]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let user = match app.orchestrator.user() {
        Some(user) => Span::styled(format!("{} 님", user.uid), Style::default().fg(Color::Green)),
        None => Span::styled("로그인하지 않음", Style::default().fg(Color::DarkGray)),
    };

    let line = Line::from(vec![
        Span::styled(
            format_korean_date(app.current_date()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("학교 {}", app.orchestrator.school_code()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        user,
    ]);

    let block = Block::default()
        .title(" mealboard ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Nearby dates; the current day is highlighted and checked days without a menu are dimmed
fn render_strip(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.current_date();
    let mut spans = Vec::new();

    for date in app.visible_dates() {
        let mut style = if !app.orchestrator.is_loaded(*date) {
            Style::default().fg(Color::Gray)
        } else if app.orchestrator.meals_for_date(*date).is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        if *date == app.today {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if *date == current {
            style = style
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(format!(" {} ", format_short_date(*date)), style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" 급식 ").borders(Borders::ALL);
    let items = app.current_items();

    if items.is_empty() {
        let date = app.current_date();
        let text = if app.orchestrator.is_loaded(date) || app.orchestrator.is_unavailable(date) {
            NO_MEAL_MESSAGE
        } else {
            "급식 정보를 불러오는 중입니다"
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let selected = app.selected_item.min(items.len() - 1);
    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(index, food)| menu_line(app, food, index == selected))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn menu_line(app: &App, food: &str, selected: bool) -> Line<'static> {
    let orchestrator = &app.orchestrator;
    let name_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(if selected { "▶ " } else { "  " }),
        Span::styled(food.to_string(), name_style),
    ];

    if let Some(mine) = orchestrator.user_rating(food) {
        spans.push(Span::styled(
            format!("  ★{}", mine),
            Style::default().fg(Color::Yellow),
        ));
    }

    let aggregate = orchestrator.average_rating(food);
    if aggregate.total_ratings > 0 {
        spans.push(Span::styled(
            format!(
                "  평균 ★{} ({})",
                format_average(aggregate.average_rating),
                aggregate.total_ratings
            ),
            Style::default().fg(Color::Gray),
        ));
    }

    if orchestrator.is_favorite(food) {
        spans.push(Span::styled("  ♥", Style::default().fg(Color::Red)));
    }

    Line::from(spans)
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.orchestrator.menu_stats(app.current_date());

    let mine = if app.orchestrator.is_signed_in() {
        format!(
            "★{} ({}개 평가)",
            format_average(stats.my_average),
            stats.my_rated
        )
    } else {
        "로그인 후 확인할 수 있습니다".to_string()
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("나의 평균 별점  ", Style::default().fg(Color::Cyan)),
            Span::raw(mine),
        ]),
        Line::from(vec![
            Span::styled("전체 평균 별점  ", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                "★{} ({}개 메뉴, {}명 평가)",
                format_average(stats.community_average),
                stats.community_rated,
                stats.total_ratings
            )),
        ]),
    ];

    let block = Block::default().title(" 별점 요약 ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Loading, then error, then the last confirmation
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let span = if app.busy || app.orchestrator.loading() {
        Span::styled("불러오는 중...", Style::default().fg(Color::Cyan))
    } else if let Some(error) = app.orchestrator.error() {
        Span::styled(error.to_string(), Style::default().fg(Color::Red))
    } else if let Some(status) = &app.status {
        Span::styled(status.clone(), Style::default().fg(Color::Green))
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(Line::from(span)), area);
}

fn render_hints(frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new("←/→ day  ↑/↓ select  Enter rate  c calendar  t today  i login  ? help  q quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, area);
}
