use anyhow::{Context, Result};
use clap::Parser;
use konami_dashboard::{
    action::Action,
    config::Config,
    dashboard::Dashboard,
    debug,
    device,
    display::Screen,
    sequence::Sequence,
};
use std::{io, path::PathBuf};

/// Show the state of a game controller and run a command when the Konami
/// code is entered on it.
#[derive(Parser, Debug)]
#[command(name = "konami-dashboard")]
#[command(version)]
struct Args {
    /// Controller to open: joystick number, or GameCube adapter port 0-3
    #[arg(value_name = "DEVICE")]
    device: Option<u32>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv). Logs go to stderr,
    /// redirect it (2>konami.log) so they do not draw over the dashboard
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    debug::init(args.verbose);

    if args.print_config {
        print!("{}", Config::default_toml()?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            Config::read_from_file(path)
                .with_context(|| format!("could not load {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(index) = args.device {
        config.device.index = index;
    }

    let controller = device::open(&config.device).context("could not open the controller")?;

    let sequence = Sequence::konami();
    sequence
        .check_device(controller.axis_count(), controller.button_count())
        .with_context(|| format!("{} cannot enter the Konami code", controller.name()))?;

    let action = Action::from_config(&config.action);

    let mut screen = Screen::enter(io::stdout()).context("could not set up the terminal")?;
    let mut dashboard = Dashboard::new(controller, sequence);
    dashboard.run(&mut screen, config.poll.interval(), &action)?;

    Ok(())
}
