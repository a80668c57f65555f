//! Terminal preview of a layout under remote control
//!
//! Focusable elements are drawn as boxes scaled from page coordinates to the
//! terminal, offset by the surface's scroll position. Keys go through the
//! same controller a TV host would use.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind as CrosstermKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect as Area},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::FocusStyle;
use crate::controller::{ControllerState, NavigationController};
use crate::geometry::{Point, Rect};
use crate::keys::{KeyEvent, KeyEventKind, Modifiers};
use crate::runtime::Runtime;
use crate::surface::{MemorySurface, Surface, SurfaceOp};

/// Translate a terminal key into a host key event
///
/// Backspace stands in for the remote's back button.
pub fn convert_key(key: event::KeyEvent) -> Option<KeyEvent> {
    let kind = match key.kind {
        CrosstermKind::Press | CrosstermKind::Repeat => KeyEventKind::Down,
        CrosstermKind::Release => KeyEventKind::Up,
    };
    let (name, code) = match key.code {
        KeyCode::Up => ("ArrowUp".to_string(), 38),
        KeyCode::Down => ("ArrowDown".to_string(), 40),
        KeyCode::Left => ("ArrowLeft".to_string(), 37),
        KeyCode::Right => ("ArrowRight".to_string(), 39),
        KeyCode::Enter => ("Enter".to_string(), 13),
        KeyCode::Esc => ("Escape".to_string(), 27),
        KeyCode::Backspace => ("GoBack".to_string(), 0),
        KeyCode::Char(' ') => (" ".to_string(), 32),
        KeyCode::Char(c) => (c.to_string(), c.to_ascii_uppercase() as u32),
        _ => return None,
    };
    let modifiers = Modifiers {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        meta: key.modifiers.contains(KeyModifiers::META),
    };
    Some(KeyEvent::new(name, code, kind).with_modifiers(modifiers))
}

fn is_quit(key: &event::KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => key.modifiers.is_empty(),
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Map a page rectangle into the drawing area
///
/// Returns `None` when the rectangle is scrolled out of view or too small to
/// draw.
pub fn project(rect: Rect, scroll: Point, viewport: Rect, area: Area) -> Option<Area> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    let sx = area.width as f64 / viewport.width;
    let sy = area.height as f64 / viewport.height;

    let left = ((rect.left - scroll.x) * sx).round();
    let top = ((rect.top - scroll.y) * sy).round();
    let right = ((rect.right() - scroll.x) * sx).round().min(area.width as f64);
    let bottom = ((rect.bottom() - scroll.y) * sy).round().min(area.height as f64);
    if left < 0.0 || top < 0.0 || right - left < 2.0 || bottom - top < 2.0 {
        return None;
    }
    Some(Area::new(
        area.x + left as u16,
        area.y + top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

/// Cut a label to `width` display columns, marking the cut with an ellipsis
pub fn truncate_label(label: &str, width: usize) -> String {
    if label.width() <= width {
        return label.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in label.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn describe_op(op: &SurfaceOp) -> String {
    match op {
        SurfaceOp::Navigate(href) => format!("navigate {}", href),
        SurfaceOp::Click(node) => format!("click {}", node),
        SurfaceOp::HistoryBack => "history back".to_string(),
        SurfaceOp::MenuOpened(node) => format!("menu {} opened", node),
        SurfaceOp::MenuClosed(node) => format!("menu {} closed", node),
        SurfaceOp::CarouselStep(node, step) => format!("carousel {} {:?}", node, step),
        SurfaceOp::Media(command) => format!("media {:?}", command),
        SurfaceOp::Highlight(node)
        | SurfaceOp::ClearHighlight(node)
        | SurfaceOp::ScrollIntoView(node)
        | SurfaceOp::Focus(node) => format!("focus {}", node),
    }
}

fn status_line(controller: &NavigationController<MemorySurface>) -> Line<'static> {
    let state = match controller.state() {
        ControllerState::Inactive => "inactive",
        ControllerState::Starting => "starting",
        ControllerState::Active => "active",
    };
    let focused = controller
        .current_index()
        .and_then(|i| controller.elements().get(i))
        .map(|e| format!("{}/{} {}", e.index + 1, controller.elements().len(), e.label))
        .unwrap_or_else(|| "-".to_string());
    let last = controller
        .surface()
        .ops()
        .iter()
        .rev()
        .find(|op| {
            !matches!(
                op,
                SurfaceOp::Highlight(_)
                    | SurfaceOp::ClearHighlight(_)
                    | SurfaceOp::ScrollIntoView(_)
                    | SurfaceOp::Focus(_)
            )
        })
        .map(describe_op)
        .unwrap_or_default();

    Line::from(vec![
        Span::styled(format!(" {} ", state), Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(format!(" focus: {}  ", focused)),
        Span::styled(last, Style::default().fg(Color::DarkGray)),
        Span::styled(
            "  arrows move, enter/space activate, esc/backspace back, ctrl+alt+t toggle, q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn draw(frame: &mut Frame, controller: &NavigationController<MemorySurface>, style: &FocusStyle) {
    let [page_area, status_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    let surface = controller.surface();
    let tree = surface.tree();
    let current = controller.current_index();
    for element in controller.elements().iter() {
        let Some(area) = project(element.rect, surface.scroll(), tree.viewport(), page_area) else {
            continue;
        };
        let focused = current == Some(element.index);
        let border = if focused {
            Style::default().fg(style.color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let title = truncate_label(&element.label, area.width.saturating_sub(2) as usize);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title);
        frame.render_widget(block, area);
    }

    frame.render_widget(Paragraph::new(status_line(controller)), status_area);
}

/// Run the preview until the user quits
pub async fn run(mut runtime: Runtime<MemorySurface>, style: FocusStyle) -> Result<(), io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        let processed = runtime.process_events();
        if processed > 0 {
            tracing::debug!("LOOP: processed {} events", processed);
        }

        terminal.draw(|f| draw(f, runtime.controller(), &style))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if is_quit(&key) {
                    tracing::debug!("LOOP: quitting");
                    break;
                }
                if let Some(host_key) = convert_key(key) {
                    runtime.dispatch_key(host_key);
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
