use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::game::MAX_MISSES;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;

/// Gallows drawing, one stage per miss; index 0 is the empty scaffold
pub const GALLOWS: [&str; 7] = [
    r#"
  +---+
  |   |
      |
      |
      |
      |
========="#,
    r#"
  +---+
  |   |
  O   |
      |
      |
      |
========="#,
    r#"
  +---+
  |   |
  O   |
  |   |
      |
      |
========="#,
    r#"
  +---+
  |   |
  O   |
 /|   |
      |
      |
========="#,
    r#"
  +---+
  |   |
  O   |
 /|\  |
      |
      |
========="#,
    r#"
  +---+
  |   |
  O   |
 /|\  |
 /    |
      |
========="#,
    r#"
  +---+
  |   |
  O   |
 /|\  |
 / \  |
      |
========="#,
];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let gallows = GALLOWS[session.gallows_stage()];
        let gallows_lines = gallows.lines().count() as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(1)
            .constraints(
                [
                    Constraint::Length(1), // status line
                    Constraint::Length(gallows_lines),
                    Constraint::Length(1), // padding
                    Constraint::Length(1), // mask
                    Constraint::Length(1), // guessed letters
                    Constraint::Min(1),    // padding
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        let status = if session.is_over() {
            if session.is_won() {
                Span::styled("you escaped the gallows", green_bold_style)
            } else if self.reveal_on_loss {
                Span::styled(
                    format!("hanged! the word was \"{}\"", session.secret()),
                    red_bold_style,
                )
            } else {
                Span::styled("hanged!", red_bold_style)
            }
        } else {
            Span::styled(
                format!("{} of {} misses", session.misses(), MAX_MISSES),
                dim_style,
            )
        };
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(gallows)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let mask = session.display_mask();
        let mask_alignment = if mask.width() <= (area.width.saturating_sub(HORIZONTAL_MARGIN * 2)) as usize {
            Alignment::Center
        } else {
            Alignment::Left
        };
        Paragraph::new(Span::styled(mask, bold_style))
            .alignment(mask_alignment)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        // guessed letters, alphabetical, hits green and misses red
        let guessed_spans: Vec<Span> = session
            .guessed()
            .iter()
            .sorted()
            .flat_map(|c| {
                let style = if session.secret().contains(*c) {
                    green_bold_style
                } else {
                    red_bold_style
                };
                [Span::styled(c.to_string(), style), Span::raw(" ")]
            })
            .collect();
        Paragraph::new(Line::from(guessed_spans))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        let legend = if matches!(self.state, AppState::Results) {
            "(r)etry word / (n)ew word / (s)tats / (esc)ape"
        } else {
            "type a letter to guess / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[6], buf);

        if self.celebration.is_active {
            render_celebration_particles(&self.celebration, area, buf);
        }
    }
}

/// Render confetti particles on top of the results screen
fn render_celebration_particles(
    celebration: &crate::celebration::WinAnimation,
    area: Rect,
    buf: &mut Buffer,
) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    // banner above the particles
    if area.height > 2 {
        let banner_width = celebration.banner.width() as u16;
        let x = area.x + (area.width.saturating_sub(banner_width)) / 2;
        let y = area.y + area.height / 2 - 1;
        buf.set_string(
            x,
            y,
            celebration.banner,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    }

    for particle in &celebration.particles {
        let x = particle.x as u16;
        let y = particle.y as u16;

        if x < area.width && y < area.height {
            let color = colors[particle.color_index % colors.len()];

            let fade = particle.fade();
            let style = if fade > 0.7 {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else if fade > 0.3 {
                Style::default().fg(color)
            } else {
                Style::default().fg(color).add_modifier(Modifier::DIM)
            };

            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_symbol(&particle.symbol.to_string());
                cell.set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::WordGuessSession;

    fn buffer_text(buf: &Buffer) -> String {
        let mut text = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                text.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            text.push('\n');
        }
        text
    }

    fn test_app(secret: &str) -> App {
        App::for_tests(WordGuessSession::with_secret(secret))
    }

    #[test]
    fn test_render_fresh_game_shows_mask_and_counter() {
        let app = test_app("cat");
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);

        (&app).render(area, &mut buf);
        let text = buffer_text(&buf);

        assert!(text.contains("_ _ _"));
        assert!(text.contains("0 of 6 misses"));
        assert!(text.contains("+---+"));
    }

    #[test]
    fn test_render_reveals_guessed_letters() {
        let mut app = test_app("cat");
        app.session.guess_letter('c');
        app.session.guess_letter('a');

        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);

        assert!(buffer_text(&buf).contains("c a _"));
    }

    #[test]
    fn test_render_lost_game_reveals_word() {
        let mut app = test_app("go");
        for c in ['a', 'b', 'c', 'd', 'e', 'f'] {
            app.session.guess_letter(c);
        }
        app.state = AppState::Results;

        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        let text = buffer_text(&buf);

        assert!(text.contains("hanged! the word was \"go\""));
        // the full gallows drawing includes both legs
        assert!(text.contains("/ \\"));
    }

    #[test]
    fn test_render_won_game() {
        let mut app = test_app("hi");
        app.session.guess_letter('h');
        app.session.guess_letter('i');
        app.state = AppState::Results;

        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        let text = buffer_text(&buf);

        assert!(text.contains("you escaped the gallows"));
        assert!(text.contains("h i"));
        assert!(text.contains("(r)etry word"));
    }

    #[test]
    fn test_gallows_has_a_stage_per_miss() {
        assert_eq!(GALLOWS.len(), MAX_MISSES as usize + 1);
        // stages only ever add strokes
        for pair in GALLOWS.windows(2) {
            assert!(pair[1].chars().filter(|c| !c.is_whitespace()).count()
                > pair[0].chars().filter(|c| !c.is_whitespace()).count());
        }
    }
}
