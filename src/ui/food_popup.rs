//! Rating popup for the selected menu item

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::RatingInput;
use crate::stats::format_average;
use crate::ui::centered_rect;

/// "★★★☆☆" for a score out of five
fn stars(score: u8) -> String {
    (1..=RatingInput::MAX_SCORE)
        .map(|n| if n <= score { '★' } else { '☆' })
        .collect()
}

pub fn render(frame: &mut Frame, app: &App) {
    let Some(food) = app.selected_food() else {
        return;
    };
    let orchestrator = &app.orchestrator;
    let area = centered_rect(44, 11, frame.area());
    frame.render_widget(Clear, area);

    let mine = orchestrator.user_rating(food).unwrap_or(0);
    let aggregate = orchestrator.average_rating(food);
    let favorite = if orchestrator.is_favorite(food) {
        Span::styled("♥ 즐겨찾기", Style::default().fg(Color::Red))
    } else {
        Span::styled("♡ 즐겨찾기 아님", Style::default().fg(Color::DarkGray))
    };

    let mut lines = vec![
        Line::from(Span::styled(
            food.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("나의 별점  "),
            Span::styled(stars(mine), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(format!(
            "전체 평균  ★{} ({}명)",
            format_average(aggregate.average_rating),
            aggregate.total_ratings
        )),
        Line::from(favorite),
        Line::from(""),
    ];

    if orchestrator.is_signed_in() {
        lines.push(Line::from(Span::styled(
            "1-5 별점  0 삭제  f 즐겨찾기  Esc 닫기",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "별점을 남기려면 로그인하세요 (Esc 닫기)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .title(" 별점 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}
