//! Month calendar popup
//!
//! Sunday-first grid of the cursor's month. Days with a loaded menu are
//! green, today is underlined, and the cursor is highlighted.

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::MonthKey;
use crate::ui::centered_rect;

const WEEKDAY_HEADER: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// Weeks of the month, Sunday first; `None` pads days outside the month
pub fn month_grid(month: MonthKey) -> Vec<[Option<NaiveDate>; 7]> {
    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut column = month.first_day().weekday().num_days_from_sunday() as usize;

    for day in month.days() {
        week[column] = Some(day);
        column += 1;
        if column == 7 {
            weeks.push(week);
            week = [None; 7];
            column = 0;
        }
    }
    if column > 0 {
        weeks.push(week);
    }
    weeks
}

pub fn render(frame: &mut Frame, app: &App, cursor: NaiveDate) {
    let month = MonthKey::containing(cursor);
    let weeks = month_grid(month);
    let height = weeks.len() as u16 + 6;
    let area = centered_rect(34, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}년 {}월", cursor.year(), cursor.month()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(
            WEEKDAY_HEADER
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let color = match i {
                        0 => Color::Red,
                        6 => Color::Blue,
                        _ => Color::Gray,
                    };
                    Span::styled(format!(" {} ", name), Style::default().fg(color))
                })
                .collect::<Vec<_>>(),
        ),
    ];

    for week in &weeks {
        let spans: Vec<Span> = week
            .iter()
            .map(|slot| match slot {
                None => Span::raw("    "),
                Some(day) => Span::styled(format!(" {:>2} ", day.day()), day_style(app, *day, cursor)),
            })
            .collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "←/→ 일  ↑/↓ 주  [/] 월  Enter 선택",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title(" 달력 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

fn day_style(app: &App, day: NaiveDate, cursor: NaiveDate) -> Style {
    let mut style = if app.orchestrator.meals_for_date(day).is_empty() {
        Style::default()
    } else {
        Style::default().fg(Color::Green)
    };
    if day == app.today {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if day == cursor {
        style = style.fg(Color::Black).bg(Color::Cyan);
    }
    style
}
