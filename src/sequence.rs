use std::fmt;
use thiserror::Error;

pub const VERT_STICK: usize = 1;
pub const HOR_STICK: usize = 0;
pub const A_BTN: u8 = 0;
pub const B_BTN: u8 = 2;

/// One tick's reading of every button and axis of a controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub buttons: u32,
    pub axes: Vec<i16>,
}

impl Snapshot {
    pub fn new(buttons: u32, axes: Vec<i16>) -> Self {
        Snapshot { buttons, axes }
    }

    /// An all-released reading with `axis_count` centered axes.
    pub fn neutral(axis_count: usize) -> Self {
        Snapshot {
            buttons: 0,
            axes: vec![0; axis_count],
        }
    }

    /// # Panics
    /// Panics if `button` is not less than 32
    pub fn is_pressed(&self, button: u8) -> bool {
        assert!(
            u32::from(button) < u32::BITS,
            "button index {} out of range",
            button
        );
        self.buttons & (1 << button) != 0
    }

    pub fn any_pressed(&self) -> bool {
        self.buttons != 0
    }

    /// # Panics
    /// Panics if the snapshot has no axis `axis`
    pub fn axis(&self, axis: usize) -> i16 {
        match self.axes.get(axis) {
            Some(value) => *value,
            None => panic!(
                "axis index {} out of range for {} axes",
                axis,
                self.axes.len()
            ),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing pressed, every axis centered.
    Idle,
    /// A single stick tilt with no button held.
    Directional { axis: usize, positive: bool },
    ButtonPress { button: u8 },
}

impl Step {
    /// Check whether `snapshot` satisfies this step.
    ///
    /// # Panics
    /// Panics if the step names an axis or button the snapshot does not have
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        match *self {
            Step::Idle => !snapshot.any_pressed() && snapshot.axes.iter().all(|v| *v == 0),
            Step::Directional { axis, positive } => {
                if snapshot.any_pressed() {
                    return false;
                }
                let value = snapshot.axis(axis);
                value != 0 && (value > 0) == positive
            }
            Step::ButtonPress { button } => snapshot.is_pressed(button),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Step::Idle => write!(f, "idle"),
            Step::Directional { axis, positive } => {
                write!(f, "axis {} {}", axis, if positive { "+" } else { "-" })
            }
            Step::ButtonPress { button } => write!(f, "button {}", button),
        }
    }
}

const fn tilt(axis: usize, positive: bool) -> Step {
    Step::Directional { axis, positive }
}

const fn press(button: u8) -> Step {
    Step::ButtonPress { button }
}

/// Up, up, down, down, left, right, left, right, B, A on the Linux joystick
/// axis convention, each input separated by a return to neutral.
pub const KONAMI_CODE: [Step; 19] = [
    tilt(VERT_STICK, false),
    Step::Idle,
    tilt(VERT_STICK, false),
    Step::Idle,
    tilt(VERT_STICK, true),
    Step::Idle,
    tilt(VERT_STICK, true),
    Step::Idle,
    tilt(HOR_STICK, false),
    Step::Idle,
    tilt(HOR_STICK, true),
    Step::Idle,
    tilt(HOR_STICK, false),
    Step::Idle,
    tilt(HOR_STICK, true),
    Step::Idle,
    press(B_BTN),
    Step::Idle,
    press(A_BTN),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GestureError {
    #[error("a gesture needs at least one step")]
    Empty,
    #[error("step {step} uses axis {axis}, but the device only has {count} axes")]
    MissingAxis {
        step: usize,
        axis: usize,
        count: usize,
    },
    #[error("step {step} uses button {button}, but the device only has {count} buttons")]
    MissingButton { step: usize, button: u8, count: usize },
}

/// Result of feeding one snapshot to a [`Sequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance<'a> {
    pub status: &'a str,
    pub triggered: bool,
}

#[derive(Debug)]
pub struct Sequence {
    steps: Vec<Step>,
    current: usize,
    matching: bool,
    status: String,
}

impl Sequence {
    pub fn new(steps: Vec<Step>) -> Result<Self, GestureError> {
        if steps.is_empty() {
            return Err(GestureError::Empty);
        }

        Ok(Sequence::start(steps))
    }

    pub fn konami() -> Self {
        Sequence::start(KONAMI_CODE.to_vec())
    }

    /// `steps` must not be empty.
    fn start(steps: Vec<Step>) -> Self {
        debug_assert!(!steps.is_empty());

        Sequence {
            steps,
            current: 0,
            matching: false,
            status: String::new(),
        }
    }

    /// Make sure every step only refers to axes and buttons the device reports.
    pub fn check_device(&self, axis_count: usize, button_count: usize) -> Result<(), GestureError> {
        let button_count = button_count.min(u32::BITS as usize);

        for (i, step) in self.steps.iter().enumerate() {
            match *step {
                Step::Idle => {}
                Step::Directional { axis, .. } if axis >= axis_count => {
                    return Err(GestureError::MissingAxis {
                        step: i,
                        axis,
                        count: axis_count,
                    })
                }
                Step::ButtonPress { button } if usize::from(button) >= button_count => {
                    return Err(GestureError::MissingButton {
                        step: i,
                        button,
                        count: button_count,
                    })
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_matching(&self) -> bool {
        self.matching
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Feed the snapshot of one tick through the state machine.
    ///
    /// A step only counts as done on the tick after it stopped matching, so
    /// every step has to be entered and then left again.
    pub fn advance(&mut self, snapshot: &Snapshot) -> Advance<'_> {
        let step_matches = self.steps[self.current].matches(snapshot);
        let mut triggered = false;

        match (step_matches, self.matching) {
            (false, true) => {
                self.current += 1;
                self.matching = false;
                self.status = format!("advancing to next step {}", self.current);

                if self.current == self.steps.len() {
                    self.current = 0;
                    self.status = String::from("trigger event");
                    triggered = true;
                    log::info!("gesture complete");
                } else {
                    log::debug!("step {} released", self.current - 1);
                }
            }
            (true, false) => {
                self.matching = true;
                self.status = format!("now matching step {}", self.current);
                log::debug!(
                    "matching step {} ({})",
                    self.current,
                    self.steps[self.current]
                );
            }
            (false, false) => {
                if self.current != 0 {
                    log::debug!("gesture cancelled at step {}", self.current);
                    self.status = format!("cancelled at step {}", self.current);
                    self.current = 0;
                }
            }
            (true, true) => {}
        }

        Advance {
            status: &self.status,
            triggered,
        }
    }
}
