pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap,
    },
};
use reticle::{
    engine::ShotOutcome,
    history::{format_duration, format_time},
    mode::GameMode,
    sensitivity::{format_cm360, format_edpi, SensitivityClass},
    session::SessionState,
    util::{as_samples, median, percentile, std_dev},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const HEADER_LINES: u16 = 1;
const FOOTER_LINES: u16 = 1;

fn split(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(HEADER_LINES),
            Constraint::Min(1),
            Constraint::Length(FOOTER_LINES),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Cells the play field occupies inside a terminal of `area`
pub fn canvas_area(area: Rect) -> Rect {
    split(area)[1]
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [header, body, footer] = split(area);
        let engine = &self.engine;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let legend = match engine.state() {
            SessionState::Idle => "(1-5) mode / (enter) start / (esc)ape",
            SessionState::Playing => "(click) shoot / (p)ause / (r)eset / (esc) end",
            SessionState::Paused => "(p) resume / (r)eset / (esc) end",
            SessionState::Finished => "(enter) again / (1-5) mode / (r) menu / (esc)ape",
        };
        let legend = match &self.notice {
            Some(notice) => Line::from(vec![
                Span::styled(notice.clone(), Style::default().fg(Color::Red)),
                Span::raw("   "),
                Span::styled(legend, italic_style),
            ]),
            None => Line::from(Span::styled(legend, italic_style)),
        };
        Paragraph::new(legend).render(footer, buf);

        match engine.state() {
            SessionState::Idle => {
                Paragraph::new(Span::styled(
                    format!("reticle - {}", engine.mode().config().name),
                    bold_style,
                ))
                .alignment(Alignment::Center)
                .render(header, buf);
                render_menu(self, body, buf);
            }
            SessionState::Playing | SessionState::Paused => {
                render_status(self, header, buf);
                render_field(self, body, buf);
                if engine.state() == SessionState::Paused {
                    let paused = Paragraph::new(Span::styled(
                        "PAUSED - (p) to resume",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
                    ))
                    .alignment(Alignment::Center);
                    let mid = Rect::new(body.x, body.y + body.height / 2, body.width, 1);
                    paused.render(mid.intersection(body), buf);
                }
            }
            SessionState::Finished => {
                Paragraph::new(Span::styled("results", bold_style))
                    .alignment(Alignment::Center)
                    .render(header, buf);
                render_results(self, body, buf);
            }
        }
    }
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let settings = engine.settings();
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let mut lines: Vec<Line> = GameMode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let config = mode.config();
            let style = if *mode == engine.mode() {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("({}) {:<14}", i + 1, config.name), style),
                Span::styled(config.description, dim_style),
            ])
        })
        .collect();

    let dpi = settings.dpi as f64;
    let sens = settings.sensitivity();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(
            "dpi {}  sens {}  eDPI {} ({})  {}/360",
            settings.dpi,
            sens,
            format_edpi(dpi, sens),
            SensitivityClass::from_edpi(settings.edpi()),
            format_cm360(dpi, sens),
        ),
        Style::default().fg(Color::Cyan),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "targets {}  difficulty {}",
            settings.target_size, settings.difficulty
        ),
        dim_style,
    )));
    if let Some(limit) = engine.config().session_length_ms {
        lines.push(Line::from(Span::styled(
            format!("session length {}", format_duration(limit)),
            dim_style,
        )));
    }

    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let inner = Rect::new(area.x, area.y + top, area.width, area.height - top);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let stats = engine.stats();
    let clock = match engine.remaining_ms() {
        Some(left) => format_time(left),
        None => format_time(engine.elapsed_ms()),
    };

    let mut spans = vec![
        Span::styled(
            format!("{}  {}", engine.mode().config().name, clock),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "   hits {}  miss {}  acc {:.1}%  avg {}ms  score {}",
            stats.hits, stats.misses, stats.accuracy, stats.average_reaction_time, stats.score
        )),
    ];
    match app.last_shot {
        Some(ShotOutcome::Hit { reaction_ms, .. }) => spans.push(Span::styled(
            format!("   hit {reaction_ms}ms"),
            Style::default().fg(Color::Green),
        )),
        Some(ShotOutcome::Miss) => {
            spans.push(Span::styled("   miss", Style::default().fg(Color::Red)))
        }
        _ => {}
    }

    let status = if engine.settings().show_stats {
        Line::from(spans)
    } else {
        Line::from(spans.swap_remove(0))
    };
    Paragraph::new(status).render(area, buf);
}

fn render_field(app: &App, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let Some(viewport) = engine.viewport() else {
        return;
    };
    let (width, height) = (viewport.width, viewport.height);
    let settings = engine.settings();
    let crosshair_color = settings
        .crosshair_color
        .parse::<Color>()
        .unwrap_or(Color::White);
    let arm = settings.crosshair_size as f64 * 2.5;

    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            // canvas y grows upwards, the engine's grows downwards
            for t in engine.targets() {
                ctx.draw(&Circle {
                    x: t.x,
                    y: height - t.y,
                    radius: t.radius,
                    color: if t.is_hit() { Color::Green } else { Color::Red },
                });
            }
            if let Some((x, y)) = engine.crosshair_position() {
                let y = height - y;
                ctx.draw(&CanvasLine::new(x - arm, y, x + arm, y, crosshair_color));
                ctx.draw(&CanvasLine::new(x, y - arm, x, y + arm, crosshair_color));
            }
        })
        .render(area, buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.engine.last_session() else {
        return;
    };
    let stats = &session.stats;
    let rating = stats.rating();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // rating
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // history line
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{rating} "),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(rating.description(), Style::default().add_modifier(Modifier::ITALIC)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let tuples = charting::reaction_coords(&stats.reaction_times);
    let (hits, slowest) = charting::compute_chart_params(&tuples);
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&tuples)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("hit")
                .bounds([1.0, hits])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(charting::format_label(hits), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("ms")
                .bounds([0.0, slowest])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(slowest), bold_style),
                ]),
        )
        .render(chunks[1], buf);

    let samples = as_samples(&stats.reaction_times);
    Paragraph::new(Span::styled(
        format!(
            "{} pts   {}% acc   {}ms avg   {}ms median   {}ms p90   {}ms sd   {}/{} hits   {}",
            stats.score,
            stats.accuracy,
            stats.average_reaction_time,
            median(&samples).round(),
            percentile(&samples, 90.0).round(),
            std_dev(&samples).round(),
            stats.hits,
            stats.total_shots,
            format_duration(session.duration)
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let Some(summary) = &app.history_summary else {
        return;
    };
    Paragraph::new(Span::styled(
        format!(
            "{} sessions   best {:.1}% acc   best {}ms avg",
            summary.total_sessions, summary.best_accuracy, summary.best_reaction_time
        ),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}
