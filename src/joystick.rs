use crate::{
    device::{Controller, DeviceError},
    sequence::Snapshot,
};
use deku::prelude::*;
use parking_lot::Mutex;
use std::{
    fmt::Debug,
    fs::File,
    io::{self, Read},
    os::unix::io::AsRawFd,
    path::PathBuf,
    sync::Arc,
    thread,
};

const JS_EVENT_LEN: usize = 8;

const JS_EVENT_BUTTON: u8 = 0x01;
const JS_EVENT_AXIS: u8 = 0x02;
const JS_EVENT_INIT: u8 = 0x80;

const NAME_LEN: usize = 128;

// _IOR('j', 0x11, __u8) and _IOR('j', 0x12, __u8)
const JSIOCGAXES: libc::c_ulong = 0x8001_6a11;
const JSIOCGBUTTONS: libc::c_ulong = 0x8001_6a12;

/// _IOC(_IOC_READ, 'j', 0x13, len)
const fn jsiocgname(len: usize) -> libc::c_ulong {
    (2 << 30) | ((len as libc::c_ulong) << 16) | (0x6a << 8) | 0x13
}

/// `struct js_event` from `linux/joystick.h`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, DekuRead)]
#[deku(endian = "little")]
pub struct JsEvent {
    /// Timestamp in milliseconds.
    pub time: u32,
    pub value: i16,
    pub kind: u8,
    pub number: u8,
}

impl JsEvent {
    pub fn parse(buf: &[u8; JS_EVENT_LEN]) -> Result<Self, DekuError> {
        let (_rest, event) = JsEvent::from_bytes((&buf[..], 0))?;
        Ok(event)
    }

    /// Fold the event into the running controller state.
    ///
    /// Events for buttons or axes outside the snapshot are dropped.
    pub fn apply(&self, state: &mut Snapshot) {
        match self.kind & !JS_EVENT_INIT {
            JS_EVENT_BUTTON if u32::from(self.number) < u32::BITS => {
                if self.value != 0 {
                    state.buttons |= 1 << self.number;
                } else {
                    state.buttons &= !(1 << self.number);
                }
            }
            JS_EVENT_AXIS => {
                if let Some(axis) = state.axes.get_mut(usize::from(self.number)) {
                    *axis = self.value;
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Snapshot,
    error: Option<String>,
}

/// A Linux joystick device, read on a background thread.
pub struct Joystick {
    name: String,
    axis_count: usize,
    button_count: usize,
    shared: Arc<Mutex<Shared>>,
}

impl Debug for Joystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Joystick {} ({} axes, {} buttons)",
            self.name, self.axis_count, self.button_count
        )
    }
}

impl Joystick {
    pub fn path(index: u32) -> PathBuf {
        PathBuf::from(format!("/dev/input/js{}", index))
    }

    pub fn open(index: u32) -> Result<Self, DeviceError> {
        let path = Joystick::path(index);
        let file = File::open(&path).map_err(|source| DeviceError::Open {
            path: path.clone(),
            source,
        })?;

        let query_err = |what| {
            let path = path.clone();
            move |source| DeviceError::Query { path, what, source }
        };

        let axis_count = query_count(&file, JSIOCGAXES).map_err(query_err("axis count"))?;
        let button_count =
            query_count(&file, JSIOCGBUTTONS).map_err(query_err("button count"))?;
        let name = query_name(&file).unwrap_or_else(|e| {
            log::warn!("could not read name of {}: {}", path.display(), e);
            String::from("Unknown")
        });

        let shared = Arc::new(Mutex::new(Shared {
            state: Snapshot::neutral(usize::from(axis_count)),
            error: None,
        }));

        let thread_shared = Arc::clone(&shared);
        thread::Builder::new()
            .name(format!("js{} reader", index))
            .spawn(move || read_events(file, thread_shared))
            .map_err(DeviceError::Thread)?;

        Ok(Joystick {
            name,
            axis_count: usize::from(axis_count),
            button_count: usize::from(button_count),
            shared,
        })
    }
}

impl Controller for Joystick {
    fn name(&self) -> &str {
        &self.name
    }

    fn axis_count(&self) -> usize {
        self.axis_count
    }

    fn button_count(&self) -> usize {
        self.button_count
    }

    fn read(&mut self) -> Result<Snapshot, DeviceError> {
        let shared = self.shared.lock();
        match &shared.error {
            Some(e) => Err(DeviceError::Disconnected(e.clone())),
            None => Ok(shared.state.clone()),
        }
    }
}

fn read_events(mut file: File, shared: Arc<Mutex<Shared>>) {
    let mut buf = [0; JS_EVENT_LEN];

    loop {
        if let Err(e) = file.read_exact(&mut buf) {
            log::warn!("joystick reader stopped: {}", e);
            shared.lock().error = Some(e.to_string());
            break;
        }

        match JsEvent::parse(&buf) {
            Ok(event) => event.apply(&mut shared.lock().state),
            Err(e) => log::debug!("skipping joystick event: {}", e),
        }
    }
}

fn query_count(file: &File, request: libc::c_ulong) -> io::Result<u8> {
    let mut count: u8 = 0;

    // SAFETY: the request writes a single byte into `count`
    let ret = unsafe { libc::ioctl(file.as_raw_fd(), request as _, &mut count as *mut u8) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(count)
}

fn query_name(file: &File) -> io::Result<String> {
    let mut buf = [0u8; NAME_LEN];

    // SAFETY: the kernel writes at most NAME_LEN bytes into `buf`
    let ret = unsafe {
        libc::ioctl(
            file.as_raw_fd(),
            jsiocgname(NAME_LEN) as _,
            buf.as_mut_ptr(),
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    let end = buf.iter().position(|b| *b == 0).unwrap_or(NAME_LEN);
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}
