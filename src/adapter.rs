use crate::{
    device::{Controller, DeviceError},
    sequence::Snapshot,
};
use deku::prelude::*;
use rusb::{DeviceHandle, GlobalContext};
use std::{fmt::Debug, time::Duration};

const ENDPOINT_IN: u8 = 0x81;
const ENDPOINT_OUT: u8 = 0x02;
const READ_LEN: usize = 37;

const CONTROL_DEADZONE: u8 = 15;
const CONTROL_SENSITIVITY: u8 = 100;
const C_DEADZONE: u8 = 15;

pub const BUTTON_COUNT: usize = 12;
pub const AXIS_COUNT: usize = 4;

pub struct GcAdapter {
    handle: DeviceHandle<GlobalContext>,
}

impl Debug for GcAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GCAdapter with product string: {}", self.product())
    }
}

impl GcAdapter {
    pub fn new() -> Result<Self, rusb::Error> {
        let device = rusb::devices()?
            .iter()
            .find(|dev| {
                dev.device_descriptor()
                    .map(|desc| desc.vendor_id() == 0x057E && desc.product_id() == 0x0337)
                    .unwrap_or(false)
            })
            .ok_or(rusb::Error::NoDevice)?;

        let mut handle = device.open()?;

        if handle.kernel_driver_active(0).unwrap_or(false) {
            handle.detach_kernel_driver(0)?;
        }

        // Nyko-brand adapters need this request; Mayflash ones answer with a pipe error.
        let _ = handle.write_control(0x21, 11, 0x0001, 0, &[], Duration::from_millis(1000));

        handle.claim_interface(0)?;
        handle.write_interrupt(ENDPOINT_OUT, &[0x13], Duration::from_millis(16))?;

        Ok(GcAdapter { handle })
    }

    pub fn product(&self) -> String {
        self.handle
            .device()
            .device_descriptor()
            .and_then(|desc| self.handle.read_product_string_ascii(&desc))
            .unwrap_or_else(|_| String::from("GameCube Adapter"))
    }

    /// Read one report, `None` if the adapter had nothing new within the timeout.
    pub fn read(&self) -> rusb::Result<Option<[u8; READ_LEN]>> {
        let mut buf = [0; READ_LEN];

        match self
            .handle
            .read_interrupt(ENDPOINT_IN, &mut buf, Duration::from_millis(16))
        {
            Ok(_) => Ok(Some(buf)),
            Err(rusb::Error::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, DekuRead)]
pub struct AdapterState {
    unknown: u8,
    pub controller_0: ControllerState,
    pub controller_1: ControllerState,
    pub controller_2: ControllerState,
    pub controller_3: ControllerState,
}

impl AdapterState {
    pub const fn new() -> Self {
        Self {
            unknown: 0,
            controller_0: ControllerState::new(),
            controller_1: ControllerState::new(),
            controller_2: ControllerState::new(),
            controller_3: ControllerState::new(),
        }
    }

    pub fn parse(buf: &[u8; READ_LEN]) -> Result<Self, DekuError> {
        let (_rest, state) = AdapterState::from_bytes((&buf[..], 0))?;
        Ok(state)
    }

    /// Get the `ControllerState` for the given channel
    pub fn controller_state(&self, channel: Channel) -> ControllerState {
        match channel {
            Channel::One => self.controller_0,
            Channel::Two => self.controller_1,
            Channel::Three => self.controller_2,
            Channel::Four => self.controller_3,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, DekuRead)]
#[deku(endian = "little")]
pub struct ControllerState {
    pub status: u8,

    #[deku(bits = "1")]
    pub a: bool,
    #[deku(bits = "1")]
    pub b: bool,
    #[deku(bits = "1")]
    pub x: bool,
    #[deku(bits = "1")]
    pub y: bool,

    #[deku(bits = "1")]
    pub left: bool,
    #[deku(bits = "1")]
    pub right: bool,
    #[deku(bits = "1")]
    pub down: bool,
    #[deku(bits = "1")]
    pub up: bool,

    #[deku(bits = "1")]
    pub start: bool,
    #[deku(bits = "1")]
    pub z: bool,
    #[deku(bits = "1")]
    pub r: bool,
    #[deku(bits = "1")]
    pub l: bool,

    #[deku(bits = "4")]
    b2_rest: u8,

    pub stick_x: u8,
    pub stick_y: u8,
    pub substick_x: u8,
    pub substick_y: u8,
    pub trigger_left: u8,
    pub trigger_right: u8,
}

impl ControllerState {
    pub const fn new() -> Self {
        Self {
            status: 0,
            a: false,
            b: false,
            x: false,
            y: false,
            left: false,
            right: false,
            down: false,
            up: false,
            start: false,
            z: false,
            r: false,
            l: false,
            b2_rest: 0,
            stick_x: 0,
            stick_y: 0,
            substick_x: 0,
            substick_y: 0,
            trigger_left: 0,
            trigger_right: 0,
        }
    }

    pub fn stick_with_deadzone(&self, deadzone: u8, sensitivity: u8) -> (i8, i8) {
        const STICK_MAX: i32 = i8::MAX as i32;

        let x = self.stick_x.wrapping_add(128) as i8;
        let y = self.stick_y.wrapping_add(128) as i8;

        // Convert cartesian coordinates to polar coordinates (radius)
        let radius = ((x as f32).powi(2) + (y as f32).powi(2)).sqrt();

        if radius <= deadzone as f32 {
            return (0, 0);
        }

        let angle = (y as f32).atan2(x as f32);

        let deadzone = deadzone as i32;
        // Higher sensitivity gives a larger radius
        let sensitivity = u8::MAX as i32 - sensitivity as i32;

        // Scale the radius past the deadzone into [-80, 80]
        let radius =
            8000.0 * (radius - deadzone as f32) / (sensitivity * (STICK_MAX - deadzone)) as f32;

        let x = (radius * angle.cos()).round() as i8;
        let y = (radius * angle.sin()).round() as i8;

        (x, y)
    }

    pub fn substick_with_deadzone(&self, deadzone: u8) -> (i8, i8) {
        let x = self.substick_x.wrapping_add(128) as i8;
        let y = self.substick_y.wrapping_add(128) as i8;

        let x = if x.unsigned_abs() < deadzone { 0 } else { x };

        let y = if y.unsigned_abs() < deadzone { 0 } else { y };

        (x, y)
    }

    pub fn is_connected(&self) -> bool {
        // 0x10 = Normal
        // 0x20 = Wavebird
        let controller_type = self.status & (0x10 | 0x20);
        controller_type == 0x10 || controller_type == 0x20
    }

    /// Buttons A, X, B, Y, Start, Z, R, L, then the D-pad left, right,
    /// down, up; axes are the main stick and the C-stick with "down"
    /// positive.
    pub fn snapshot(&self) -> Snapshot {
        let pressed = [
            self.a, self.x, self.b, self.y, self.start, self.z, self.r, self.l, self.left,
            self.right, self.down, self.up,
        ];
        let buttons = pressed
            .iter()
            .enumerate()
            .filter(|(_, p)| **p)
            .fold(0, |bits, (i, _)| bits | 1 << i);

        let (stick_x, stick_y) = self.stick_with_deadzone(CONTROL_DEADZONE, CONTROL_SENSITIVITY);
        let (substick_x, substick_y) = self.substick_with_deadzone(C_DEADZONE);

        Snapshot::new(
            buttons,
            vec![
                i16::from(stick_x),
                -i16::from(stick_y),
                i16::from(substick_x),
                -i16::from(substick_y),
            ],
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Channel {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
}

impl TryFrom<u32> for Channel {
    type Error = u32;

    fn try_from(val: u32) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(Channel::One),
            1 => Ok(Channel::Two),
            2 => Ok(Channel::Three),
            3 => Ok(Channel::Four),
            x => Err(x),
        }
    }
}

/// One port of a GameCube adapter.
#[derive(Debug)]
pub struct GcController {
    adapter: GcAdapter,
    channel: Channel,
    name: String,
    last: AdapterState,
}

impl GcController {
    pub fn open(channel: Channel) -> Result<Self, DeviceError> {
        let adapter = GcAdapter::new()?;
        let name = format!("{} (port {})", adapter.product(), channel as usize);

        Ok(GcController {
            adapter,
            channel,
            name,
            last: AdapterState::new(),
        })
    }
}

impl Controller for GcController {
    fn name(&self) -> &str {
        &self.name
    }

    fn axis_count(&self) -> usize {
        AXIS_COUNT
    }

    fn button_count(&self) -> usize {
        BUTTON_COUNT
    }

    fn read(&mut self) -> Result<Snapshot, DeviceError> {
        if let Some(buf) = self.adapter.read()? {
            self.last = AdapterState::parse(&buf)?;
        }

        let state = self.last.controller_state(self.channel);
        if !state.is_connected() {
            return Err(DeviceError::NotConnected(self.channel as usize));
        }

        Ok(state.snapshot())
    }
}
