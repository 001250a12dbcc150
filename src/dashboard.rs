use crate::{
    action::Action,
    device::Controller,
    display::{layout, Cell, DeviceInfo, Screen},
    sequence::Sequence,
};
use crossbeam_channel::{select, tick, unbounded, Receiver};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    io::{self, Write},
    thread,
    time::Duration,
};

/// What one tick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub cells: Vec<Cell>,
    pub triggered: bool,
}

pub fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Owns the controller and the gesture state, and drives both once per tick.
pub struct Dashboard {
    controller: Box<dyn Controller>,
    info: DeviceInfo,
    sequence: Sequence,
}

impl Dashboard {
    pub fn new(controller: Box<dyn Controller>, sequence: Sequence) -> Self {
        let info = DeviceInfo::of(controller.as_ref());

        Dashboard {
            controller,
            info,
            sequence,
        }
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Read the controller, feed the gesture engine and lay out the result.
    ///
    /// A failed read is shown in place of the buttons and leaves the engine
    /// untouched.
    pub fn tick(&mut self) -> Frame {
        match self.controller.read() {
            Ok(snapshot) => {
                let advance = self.sequence.advance(&snapshot);
                let triggered = advance.triggered;
                let cells = layout(&self.info, Ok(&snapshot), advance.status);

                Frame { cells, triggered }
            }
            Err(e) => {
                log::debug!("read failed: {}", e);
                Frame {
                    cells: layout(&self.info, Err(&e), self.sequence.status()),
                    triggered: false,
                }
            }
        }
    }

    /// Run until a quit key is pressed.
    pub fn run<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        interval: Duration,
        action: &Action,
    ) -> io::Result<()> {
        let input = spawn_input_reader()?;
        let ticker = tick(interval);

        loop {
            select! {
                recv(input) -> msg => match msg {
                    Ok(Ok(Event::Key(key))) if is_quit(&key) => break,
                    Ok(Ok(Event::Resize(..))) => screen.clear()?,
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => return Err(e),
                    Err(_) => {
                        return Err(io::Error::new(
                            io::ErrorKind::BrokenPipe,
                            "terminal input closed",
                        ))
                    }
                },
                recv(ticker) -> _ => {
                    let frame = self.tick();
                    screen.draw(&frame.cells)?;

                    if frame.triggered {
                        if let Err(e) = action.fire() {
                            log::error!("could not start trigger action: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Forward terminal events to a channel from a dedicated thread.
fn spawn_input_reader() -> io::Result<Receiver<io::Result<Event>>> {
    let (tx, rx) = unbounded();

    thread::Builder::new()
        .name(String::from("terminal input"))
        .spawn(move || loop {
            let event = event::read();
            let failed = event.is_err();
            if tx.send(event).is_err() || failed {
                break;
            }
        })?;

    Ok(rx)
}
