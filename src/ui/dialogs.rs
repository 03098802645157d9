//! Sign-in prompt and sign-out confirmation

use ratatui::{
    layout::Alignment,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::centered_rect;

pub fn render_sign_in(frame: &mut Frame, input: &str) {
    let area = centered_rect(44, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from("사용자 ID를 입력하세요"),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(input.to_string()),
            Span::styled("_", Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter 로그인  Esc 취소",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" 로그인 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_logout_confirm(frame: &mut Frame, app: &App) {
    let area = centered_rect(40, 6, frame.area());
    frame.render_widget(Clear, area);

    let who = app
        .orchestrator
        .user()
        .map(|user| format!("{} 님, ", user.uid))
        .unwrap_or_default();

    let lines = vec![
        Line::from(format!("{}로그아웃하시겠습니까?", who)),
        Line::from(""),
        Line::from(Span::styled(
            "y 로그아웃  n 취소",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" 로그아웃 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}
