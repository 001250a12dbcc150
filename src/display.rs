use crate::{
    device::{Controller, DeviceError},
    sequence::Snapshot,
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};

const BUTTON_ROW: u16 = 5;
const FIRST_AXIS_ROW: u16 = 7;
const STATUS_ROW: u16 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub axis_count: usize,
    pub button_count: usize,
}

impl DeviceInfo {
    pub fn of(controller: &dyn Controller) -> Self {
        DeviceInfo {
            name: controller.name().to_owned(),
            axis_count: controller.axis_count(),
            button_count: controller.button_count(),
        }
    }
}

/// A line of text starting at column `x`, row `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub x: u16,
    pub y: u16,
    pub text: String,
}

impl Cell {
    fn new<S: Into<String>>(x: u16, y: u16, text: S) -> Self {
        Cell {
            x,
            y,
            text: text.into(),
        }
    }
}

/// Lay out one frame of the dashboard.
pub fn layout(
    info: &DeviceInfo,
    reading: Result<&Snapshot, &DeviceError>,
    status: &str,
) -> Vec<Cell> {
    let mut cells = vec![
        Cell::new(1, 0, "-- Press 'q' to Exit --"),
        Cell::new(1, 1, format!("Joystick Name: {}", info.name)),
        Cell::new(1, 2, format!("   Axis Count: {}", info.axis_count)),
        Cell::new(1, 3, format!(" Button Count: {}", info.button_count)),
    ];

    match reading {
        Ok(snapshot) => {
            let marks: String = (0..info.button_count.min(u32::BITS as usize))
                .map(|b| if snapshot.is_pressed(b as u8) { 'X' } else { '.' })
                .collect();
            cells.push(Cell::new(1, BUTTON_ROW, format!("Buttons: {}", marks)));

            for (axis, value) in snapshot.axes.iter().enumerate() {
                cells.push(Cell::new(
                    1,
                    FIRST_AXIS_ROW + axis as u16,
                    format!("Axis {:2} Value: {:7}", axis, value),
                ));
            }
        }
        Err(e) => cells.push(Cell::new(1, BUTTON_ROW, format!("Error: {}", e))),
    }

    let status_row = STATUS_ROW.max(FIRST_AXIS_ROW + info.axis_count as u16 + 1);
    cells.push(Cell::new(1, status_row, status));

    cells
}

/// The terminal in raw mode on the alternate screen, restored on drop.
pub struct Screen<W: Write> {
    out: W,
}

impl<W: Write> Screen<W> {
    pub fn enter(mut out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }

        Ok(Screen { out })
    }

    pub fn draw(&mut self, cells: &[Cell]) -> io::Result<()> {
        for cell in cells {
            queue!(
                self.out,
                MoveTo(cell.x, cell.y),
                Print(&cell.text),
                Clear(ClearType::UntilNewLine)
            )?;
        }

        self.out.flush()
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::All))
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DeviceInfo {
        DeviceInfo {
            name: String::from("Test Pad"),
            axis_count: 2,
            button_count: 4,
        }
    }

    fn text_at(cells: &[Cell], y: u16) -> Option<&str> {
        cells.iter().find(|c| c.y == y).map(|c| c.text.as_str())
    }

    #[test]
    fn header() {
        let cells = layout(&info(), Ok(&Snapshot::neutral(2)), "");

        assert_eq!(text_at(&cells, 0), Some("-- Press 'q' to Exit --"));
        assert_eq!(text_at(&cells, 1), Some("Joystick Name: Test Pad"));
        assert_eq!(text_at(&cells, 2), Some("   Axis Count: 2"));
        assert_eq!(text_at(&cells, 3), Some(" Button Count: 4"));
    }

    #[test]
    fn buttons_and_axes() {
        let snapshot = Snapshot::new(0b0101, vec![-32767, 12]);
        let cells = layout(&info(), Ok(&snapshot), "now matching step 3");

        assert_eq!(text_at(&cells, 5), Some("Buttons: X.X."));
        assert_eq!(text_at(&cells, 7), Some("Axis  0 Value:  -32767"));
        assert_eq!(text_at(&cells, 8), Some("Axis  1 Value:      12"));
        assert_eq!(text_at(&cells, 20), Some("now matching step 3"));

        // the first button mark sits in column 10
        let row = cells.iter().find(|c| c.y == 5).unwrap();
        assert_eq!(row.text.find('X').map(|i| i as u16 + row.x), Some(10));
    }

    #[test]
    fn read_error_replaces_buttons() {
        let err = DeviceError::Disconnected(String::from("No such device"));
        let cells = layout(&info(), Err(&err), "cancelled at step 2");

        assert_eq!(
            text_at(&cells, 5),
            Some("Error: controller disconnected: No such device")
        );
        assert_eq!(text_at(&cells, 7), None);
        assert_eq!(text_at(&cells, 20), Some("cancelled at step 2"));
    }

    #[test]
    fn status_moves_below_many_axes() {
        let info = DeviceInfo {
            axis_count: 16,
            ..info()
        };
        let cells = layout(&info, Ok(&Snapshot::neutral(16)), "trigger event");

        assert_eq!(text_at(&cells, 22), Some("Axis 15 Value:       0"));
        assert_eq!(text_at(&cells, 24), Some("trigger event"));
    }
}
