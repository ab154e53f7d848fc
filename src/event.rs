use crossterm::event::KeyEvent;

/// Messages produced by the terminal event pump. `Key` includes Ctrl+C:
/// text-editing modes treat it as cancel, so quitting is the app's call,
/// not the pump's.
#[derive(Debug, Clone)]
pub enum Event {
    Init,
    Tick,
    Render,
    Key(KeyEvent),
}
