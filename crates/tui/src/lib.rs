use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use dbnav_core::connection_manager::DatabaseBackend;
use dbnav_core::layout::{Area, Point};
use dbnav_core::navigator::ScreenNavigator;
use dbnav_core::session::Screen;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::{debug, info};

mod render;

/// Roughly 60 frames per second.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const PAGE_ROWS: i32 = 10;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    Quit,
    Click(Point),
    Wheel(i32),
    Input(char),
    Backspace,
    NextField,
    Submit,
    Back,
}

/// Runs the frame loop until the user quits. Every database call is driven to
/// completion on `runtime` from this thread, so the screen does not repaint
/// while a query is in flight. The connection is closed before returning,
/// whether or not the loop failed.
pub fn run<B: DatabaseBackend>(
    navigator: &mut ScreenNavigator<B>,
    runtime: &Runtime,
) -> Result<(), TuiError> {
    let mut terminal = setup_terminal()?;
    let run_result = run_loop(&mut terminal, navigator, runtime);
    runtime.block_on(navigator.shutdown());
    let restore_result = restore_terminal(&mut terminal);

    if let Err(error) = run_result {
        restore_result?;
        return Err(error);
    }

    restore_result?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), TuiError> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<B: DatabaseBackend>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    navigator: &mut ScreenNavigator<B>,
    runtime: &Runtime,
) -> Result<(), TuiError> {
    info!("frame loop started");
    let mut last_frame = Instant::now();

    loop {
        let size = terminal.size()?;
        navigator.set_viewport(Area::new(0, 0, size.width, size.height));
        terminal.draw(|frame| render::draw(frame, &*navigator))?;

        let timeout = FRAME_INTERVAL
            .checked_sub(last_frame.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            let screen = navigator.state().screen;
            if let Some(message) = map_event(event::read()?, screen) {
                if !dispatch(navigator, runtime, message) {
                    break;
                }
            }
        }

        if last_frame.elapsed() >= FRAME_INTERVAL {
            last_frame = Instant::now();
        }
    }

    info!("frame loop stopped");
    Ok(())
}

/// Applies one message. Returns `false` once the user asked to quit.
fn dispatch<B: DatabaseBackend>(
    navigator: &mut ScreenNavigator<B>,
    runtime: &Runtime,
    message: Msg,
) -> bool {
    let outcome = match message {
        Msg::Quit => return false,
        Msg::Click(point) => runtime.block_on(navigator.click(point)),
        Msg::Submit => runtime.block_on(navigator.submit()),
        Msg::Wheel(delta) => {
            navigator.scroll(delta);
            Ok(())
        }
        Msg::Input(ch) => {
            navigator.type_char(ch);
            Ok(())
        }
        Msg::Backspace => {
            navigator.backspace();
            Ok(())
        }
        Msg::NextField => {
            navigator.focus_next();
            Ok(())
        }
        Msg::Back => {
            navigator.back();
            Ok(())
        }
    };

    if let Err(error) = outcome {
        debug!(%error, "gesture left the screen unchanged");
    }
    true
}

fn map_event(event: Event, screen: Screen) -> Option<Msg> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key_event(key, screen),
        Event::Mouse(mouse) => map_mouse_event(mouse),
        _ => None,
    }
}

fn map_key_event(key: KeyEvent, screen: Screen) -> Option<Msg> {
    let editing = screen == Screen::Login;
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => Some(Msg::Quit),
        (_, KeyCode::Enter) => Some(Msg::Submit),
        (_, KeyCode::Tab) => Some(Msg::NextField),
        (_, KeyCode::Backspace) if editing => Some(Msg::Backspace),
        (KeyModifiers::CONTROL, _) => None,
        (_, KeyCode::Char(ch)) if editing => Some(Msg::Input(ch)),
        (_, KeyCode::Char('q')) => Some(Msg::Quit),
        (_, KeyCode::Backspace | KeyCode::Left | KeyCode::Char('b' | 'h')) => Some(Msg::Back),
        (_, KeyCode::Up | KeyCode::Char('k')) => Some(Msg::Wheel(1)),
        (_, KeyCode::Down | KeyCode::Char('j')) => Some(Msg::Wheel(-1)),
        (_, KeyCode::PageUp) => Some(Msg::Wheel(PAGE_ROWS)),
        (_, KeyCode::PageDown) => Some(Msg::Wheel(-PAGE_ROWS)),
        _ => None,
    }
}

fn map_mouse_event(mouse: MouseEvent) -> Option<Msg> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            Some(Msg::Click(Point::new(mouse.column, mouse.row)))
        }
        MouseEventKind::ScrollUp => Some(Msg::Wheel(1)),
        MouseEventKind::ScrollDown => Some(Msg::Wheel(-1)),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use crossterm::event::{
        Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use dbnav_core::layout::{Area, Point};
    use dbnav_core::navigator::{NavigatorSettings, ScreenNavigator};
    use dbnav_core::session::{LoginField, Screen};

    use super::test_support::StaticBackend;
    use super::{dispatch, map_event, map_key_event, map_mouse_event, Msg};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime should build")
    }

    #[test]
    fn login_screen_routes_characters_to_the_form() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('q')), Screen::Login),
            Some(Msg::Input('q'))
        );
        assert_eq!(
            map_key_event(key(KeyCode::Backspace), Screen::Login),
            Some(Msg::Backspace)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Enter), Screen::Login),
            Some(Msg::Submit)
        );
    }

    #[test]
    fn list_screens_use_navigation_keys() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('q')), Screen::TableList),
            Some(Msg::Quit)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Backspace), Screen::TableData),
            Some(Msg::Back)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Down), Screen::DatabaseList),
            Some(Msg::Wheel(-1))
        );
    }

    #[test]
    fn quit_keys_work_everywhere() {
        for screen in [Screen::Login, Screen::DatabaseList, Screen::TableData] {
            assert_eq!(map_key_event(key(KeyCode::Esc), screen), Some(Msg::Quit));
            assert_eq!(
                map_key_event(
                    KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                    screen
                ),
                Some(Msg::Quit)
            );
        }
        assert_eq!(
            map_key_event(
                KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL),
                Screen::Login
            ),
            None
        );
    }

    #[test]
    fn mouse_press_and_wheel_are_mapped() {
        assert_eq!(
            map_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 7, 9)),
            Some(Msg::Click(Point::new(7, 9)))
        );
        assert_eq!(
            map_mouse_event(mouse(MouseEventKind::ScrollUp, 0, 0)),
            Some(Msg::Wheel(1))
        );
        assert_eq!(
            map_mouse_event(mouse(MouseEventKind::ScrollDown, 0, 0)),
            Some(Msg::Wheel(-1))
        );
        assert_eq!(
            map_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 7, 9)),
            None
        );
        assert_eq!(
            map_event(
                Event::Mouse(mouse(MouseEventKind::Down(MouseButton::Right), 1, 1)),
                Screen::Login
            ),
            None
        );
    }

    #[test]
    fn dispatch_drives_login_to_database_list() {
        let runtime = runtime();
        let backend = StaticBackend {
            databases: vec!["shop".to_string(), "hr".to_string()],
            ..StaticBackend::default()
        };
        let mut navigator = ScreenNavigator::new(backend, NavigatorSettings::default());
        navigator.set_viewport(Area::new(0, 0, 100, 30));

        let port = navigator.layout().field(LoginField::Port);
        assert!(dispatch(
            &mut navigator,
            &runtime,
            Msg::Click(Point::new(port.x + 1, port.y + 1))
        ));
        for ch in "3306".chars() {
            dispatch(&mut navigator, &runtime, Msg::Input(ch));
        }
        dispatch(&mut navigator, &runtime, Msg::Submit);

        assert_eq!(navigator.state().screen, Screen::DatabaseList);
        assert_eq!(navigator.state().databases.as_slice(), &["shop", "hr"]);
    }

    #[test]
    fn dispatch_keeps_running_after_failed_gesture() {
        let runtime = runtime();
        let mut navigator =
            ScreenNavigator::new(StaticBackend::default(), NavigatorSettings::default());
        navigator.set_viewport(Area::new(0, 0, 100, 30));

        assert!(dispatch(&mut navigator, &runtime, Msg::Submit));
        assert_eq!(navigator.state().screen, Screen::Login);
        assert!(navigator.state().status.is_some());
        assert!(!dispatch(&mut navigator, &runtime, Msg::Quit));
    }
}
