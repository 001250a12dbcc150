use konami_dashboard::{
    config::{Backend, DeviceConfig},
    debug, device,
};
use std::{
    env,
    process,
    thread,
    time::{Duration, Instant},
};

fn main() {
    debug::init(1);

    let mut config = DeviceConfig::default();
    let mut args = env::args().skip(1);

    if let Some(index) = args.next() {
        config.index = match index.parse() {
            Ok(index) => index,
            Err(e) => {
                eprintln!("device must be a number: {}", e);
                process::exit(1);
            }
        };
    }
    if let Some("gc-adapter") = args.next().as_deref() {
        config.backend = Backend::GcAdapter;
    }

    let mut controller = match device::open(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    println!(
        "{}: {} axes, {} buttons",
        controller.name(),
        controller.axis_count(),
        controller.button_count()
    );

    let started = Instant::now();
    let mut last = None;

    while started.elapsed() < Duration::from_secs(10) {
        match controller.read() {
            Ok(snapshot) => {
                if last.as_ref() != Some(&snapshot) {
                    println!("buttons {:#034b} axes {:?}", snapshot.buttons, snapshot.axes);
                    last = Some(snapshot);
                }
            }
            Err(e) => eprintln!("read failed: {}", e),
        }

        thread::sleep(Duration::from_millis(10));
    }
}
