use crate::{
    adapter::{Channel, GcController},
    config::{Backend, DeviceConfig},
    joystick::Joystick,
    sequence::Snapshot,
};
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("could not open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("could not query {what} of {}: {source}", .path.display())]
    Query {
        path: PathBuf,
        what: &'static str,
        source: io::Error,
    },
    #[error("could not start reader thread: {0}")]
    Thread(io::Error),
    #[error("controller disconnected: {0}")]
    Disconnected(String),
    #[error("malformed report: {0}")]
    Decode(#[from] deku::DekuError),
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),
    #[error("adapter port {0} does not exist, expected 0-3")]
    NoSuchChannel(u32),
    #[error("no controller in adapter port {0}")]
    NotConnected(usize),
}

/// A source of controller snapshots.
pub trait Controller {
    fn name(&self) -> &str;

    fn axis_count(&self) -> usize;

    fn button_count(&self) -> usize;

    /// Latest state of the controller.
    fn read(&mut self) -> Result<Snapshot, DeviceError>;
}

/// Open the controller selected by `config`.
pub fn open(config: &DeviceConfig) -> Result<Box<dyn Controller>, DeviceError> {
    let controller: Box<dyn Controller> = match config.backend {
        Backend::Joystick => Box::new(Joystick::open(config.index)?),
        Backend::GcAdapter => {
            let channel = Channel::try_from(config.index).map_err(DeviceError::NoSuchChannel)?;
            Box::new(GcController::open(channel)?)
        }
    };

    log::info!(
        "opened {} ({} axes, {} buttons)",
        controller.name(),
        controller.axis_count(),
        controller.button_count()
    );

    Ok(controller)
}
