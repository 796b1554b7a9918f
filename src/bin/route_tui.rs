//! Recorrer Route Builder - Terminal User Interface
//!
//! Interactive graph construction and nearest-neighbor routing using
//! ratatui. App logic lives in `recorrer::tui::route_app`; this binary
//! owns terminal I/O and the journal export key ('j').

#![forbid(unsafe_code)]

#[cfg(feature = "tui")]
fn main() -> std::io::Result<()> {
    use recorrer::tui::route_app::RouteApp;

    let args: Vec<String> = std::env::args().collect();

    let app = if let Some(yaml_path) = args.get(1) {
        match RouteApp::from_yaml_file(yaml_path) {
            Ok(app) => {
                eprintln!(
                    "Loaded: {yaml_path} ({} nodes, {} edges)",
                    app.graph().node_count(),
                    app.graph().edge_count()
                );
                app
            }
            Err(e) => {
                eprintln!("Error loading '{yaml_path}': {e}");
                eprintln!("Usage: route-tui [path/to/instance.yaml]");
                std::process::exit(1);
            }
        }
    } else {
        RouteApp::new()
    };

    tui::run(app)
}

#[cfg(not(feature = "tui"))]
fn main() {
    eprintln!("TUI feature not enabled. Run with: cargo run --bin route-tui --features tui");
    std::process::exit(1);
}

#[cfg(feature = "tui")]
mod tui {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::{
        backend::CrosstermBackend,
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{
            canvas::{Canvas, Line as CanvasLine},
            Block, Borders, Paragraph,
        },
        Frame, Terminal,
    };
    use recorrer::tui::route_app::{RouteApp, CANVAS_HEIGHT, CANVAS_WIDTH};
    use std::io;
    use std::time::Duration;

    const JOURNAL_PATH: &str = "route_journal.json";

    pub fn run(mut app: RouteApp) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = run_main_loop(&mut terminal, &mut app);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_main_loop(
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        app: &mut RouteApp,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(200);

        loop {
            terminal.draw(|f| ui(f, app))?;

            if crossterm::event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        // Journal export needs file I/O, so it stays in the
                        // binary; everything else goes to the app.
                        if key.code == KeyCode::Char('j') && !app.is_editing() {
                            export_journal(app);
                        } else {
                            app.handle_key(key.code);
                        }
                    }
                }
            }

            if app.should_quit() {
                break;
            }
        }

        Ok(())
    }

    fn export_journal(app: &mut RouteApp) {
        match app.export_journal() {
            Ok(json) => match std::fs::write(JOURNAL_PATH, json) {
                Ok(()) => app.set_status(format!("journal written to {JOURNAL_PATH}")),
                Err(e) => app.set_status(format!("journal write failed: {e}")),
            },
            Err(e) => app.set_status(format!("journal export failed: {e}")),
        }
    }

    fn ui(f: &mut Frame, app: &RouteApp) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(f.area());

        render_title(f, chunks[0]);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_graph_canvas(f, main_chunks[0], app);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Min(6),
                Constraint::Length(15),
            ])
            .split(main_chunks[1]);

        render_route_panel(f, right_chunks[0], app);
        render_edge_table(f, right_chunks[1], app);
        render_controls(f, right_chunks[2], app);

        render_status_bar(f, chunks[2], app);
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let version = option_env!("RECORRER_VERSION").unwrap_or("dev");
        let title = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                " Route Builder ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("- nearest-neighbor heuristic "),
            Span::styled(format!("v{version}"), Style::default().fg(Color::Gray)),
        ])])
        .block(Block::default().borders(Borders::ALL).title("recorrer"));
        f.render_widget(title, area);
    }

    fn render_graph_canvas(f: &mut Frame, area: Rect, app: &RouteApp) {
        let graph = app.graph();
        let route_path = app.last_report.as_ref().map(|r| &r.route.path);
        let marked = app.marked;
        let cursor = app.cursor;

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Graph (Gray=Edges, Green=Route, +=Cursor)"),
            )
            .x_bounds([0.0, CANVAS_WIDTH])
            .y_bounds([0.0, CANVAS_HEIGHT])
            .paint(move |ctx| {
                // All edges first, so the route overdraws them.
                for edge in graph.edges() {
                    if let (Some(a), Some(b)) = (graph.node(edge.from), graph.node(edge.to)) {
                        ctx.draw(&CanvasLine {
                            x1: a.x,
                            y1: a.y,
                            x2: b.x,
                            y2: b.y,
                            color: Color::Gray,
                        });
                    }
                }

                if let Some(path) = route_path {
                    for pair in path.windows(2) {
                        if let [from, to] = pair {
                            if let (Some(a), Some(b)) = (graph.node(*from), graph.node(*to)) {
                                ctx.draw(&CanvasLine {
                                    x1: a.x,
                                    y1: a.y,
                                    x2: b.x,
                                    y2: b.y,
                                    color: Color::Green,
                                });
                            }
                        }
                    }
                }

                for node in graph.nodes() {
                    let style = if marked == Some(node.id) {
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD)
                    };
                    ctx.print(
                        node.x,
                        node.y,
                        Span::styled(format!("{}:{}", node.id, node.label), style),
                    );
                }

                ctx.print(
                    cursor.0,
                    cursor.1,
                    Span::styled(
                        "+",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                );
            });

        f.render_widget(canvas, area);
    }

    fn render_route_panel(f: &mut Frame, area: Rect, app: &RouteApp) {
        let mut lines = vec![Line::from(vec![
            Span::raw("Instance: "),
            app.instance_name().map_or_else(
                || Span::styled("(none)", Style::default().fg(Color::Gray)),
                |name| Span::styled(name.to_string(), Style::default().fg(Color::Cyan)),
            ),
        ])];

        if let Some(best) = app.meta.as_ref().and_then(|m| m.best_known) {
            lines.push(Line::from(vec![
                Span::raw("Best known: "),
                Span::styled(format!("{best:.1}"), Style::default().fg(Color::Magenta)),
            ]));
        }
        lines.push(Line::from(""));

        if let Some(report) = &app.last_report {
            let route = &report.route;
            let path_text = route
                .path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            let shape = if route.is_closed() { "closed" } else { "open" };

            lines.push(Line::from(vec![
                Span::raw("Length: "),
                Span::styled(
                    format!("{:.3}", route.length),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::raw("Path: "),
                Span::styled(path_text, Style::default().fg(Color::Green)),
            ]));
            lines.push(Line::from(vec![
                Span::raw("Shape: "),
                Span::styled(shape, Style::default().fg(Color::Yellow)),
                if route.visits_all(app.graph().node_count()) {
                    Span::raw("")
                } else {
                    Span::styled(" (partial)", Style::default().fg(Color::Red))
                },
            ]));
            lines.push(Line::from(vec![
                Span::raw("Elapsed: "),
                Span::styled(
                    format!("{:.6} s", report.elapsed_seconds()),
                    Style::default().fg(Color::Blue),
                ),
            ]));
            if let Some(gap) = app.gap_vs_best_known() {
                lines.push(Line::from(vec![
                    Span::raw("Gap: "),
                    Span::styled(
                        format!("{gap:+.1}%"),
                        Style::default().fg(if gap <= 0.0 { Color::Green } else { Color::Red }),
                    ),
                ]));
            }
        } else {
            lines.push(Line::from(Span::styled(
                "No route yet - press s or a",
                Style::default().fg(Color::Gray),
            )));
        }

        let panel =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Route"));
        f.render_widget(panel, area);
    }

    fn render_edge_table(f: &mut Frame, area: Rect, app: &RouteApp) {
        let edges = app.graph().edges();
        let visible = area.height.saturating_sub(3) as usize;

        let mut lines = vec![Line::from(Span::styled(
            format!("{:>4} {:>4} {:>10}", "from", "to", "weight"),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if edges.len() > visible {
            lines.push(Line::from(Span::styled(
                format!("(showing last {visible} of {})", edges.len()),
                Style::default().fg(Color::Gray),
            )));
        }
        let skip = edges.len().saturating_sub(visible);
        for edge in &edges[skip..] {
            lines.push(Line::from(format!(
                "{:>4} {:>4} {:>10.2}",
                edge.from, edge.to, edge.weight
            )));
        }

        let table = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Edges ({})", edges.len())),
        );
        f.render_widget(table, area);
    }

    fn render_controls(f: &mut Frame, area: Rect, app: &RouteApp) {
        let mode_line = if let Some(buffer) = &app.input {
            Line::from(vec![
                Span::raw("Editing weight: "),
                Span::styled(
                    format!("{buffer}_"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        } else {
            Line::from(vec![
                Span::raw("Cursor: "),
                Span::styled(
                    format!("({:.0}, {:.0})", app.cursor.0, app.cursor.1),
                    Style::default().fg(Color::Red),
                ),
            ])
        };

        let controls_text = vec![
            mode_line,
            Line::from(""),
            Line::from(Span::styled(
                "Controls:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(" Arrows - Move cursor"),
            Line::from(" n      - Add node at cursor"),
            Line::from(" m      - Mark edge source"),
            Line::from(" e      - Edge: marked -> nearest"),
            Line::from(" w      - Edit weight (Enter/Esc)"),
            Line::from(" s      - Solve from nearest"),
            Line::from(" a      - Solve all starts"),
            Line::from(" d      - Load classroom graph"),
            Line::from(" r      - Reset graph"),
            Line::from(" j      - Export journal"),
            Line::from(" q      - Quit"),
        ];

        let controls = Paragraph::new(controls_text)
            .block(Block::default().borders(Borders::ALL).title("Controls"));
        f.render_widget(controls, area);
    }

    fn render_status_bar(f: &mut Frame, area: Rect, app: &RouteApp) {
        let rejected = app
            .session
            .journal()
            .last()
            .is_some_and(recorrer::session::CommandEntry::is_rejection);

        let (status_style, border_style) = if rejected {
            (
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Yellow),
            )
        } else {
            (
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Green),
            )
        };

        let status_text = Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(&app.status, status_style),
            Span::raw(" | "),
            Span::raw(format!("Steps: {} ", app.session.journal().len())),
        ]);

        let status_bar = Paragraph::new(status_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );

        f.render_widget(status_bar, area);
    }

}
