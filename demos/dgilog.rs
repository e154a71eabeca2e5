//! DGI Logger Example
//!
//! Signs on to a DGI gateway, prints its identification and interfaces,
//! configures SPI for 8-bit characters and streams everything received on
//! the SPI interface to stdout until Ctrl-C.
//!
//! Run with `RUST_LOG=debug` to see the configuration readback, or
//! `RUST_LOG=trace` for raw frames.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dgi::{
    config_name, interface_name, Session, DGI_CFG_SPI_CHARLEN, DGI_ITF_ID_SPI, DGI_ITF_STATE_ON,
};
use log::{debug, error, info, warn};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Start");

    let mut session = Session::open()?;

    let ack = session.sign_on()?;
    let result = log_session(&mut session, &ack);

    // Always try to sign off, even after a failure
    if let Err(e) = session.sign_off() {
        warn!("Can't sign off: {}", e);
    }

    info!("Stop");
    result
}

fn log_session(session: &mut Session, ack: &str) -> Result<(), Box<dyn std::error::Error>> {
    let version = session.get_version()?;
    info!("{} {}", ack, version);

    let mut names = Vec::new();
    for itf in session.interface_list()? {
        match interface_name(itf) {
            Ok(name) => names.push(name),
            Err(_) => warn!("Unknown interface: 0x{:02X}", itf),
        }
    }
    info!("Interfaces: {}", names.join(", "));

    session.interfaces_set_config(DGI_ITF_ID_SPI, [(DGI_CFG_SPI_CHARLEN, 8)])?;
    session.interfaces_enable([(DGI_ITF_ID_SPI, DGI_ITF_STATE_ON)])?;

    for (id, value) in session.interfaces_get_config(DGI_ITF_ID_SPI)? {
        match config_name(DGI_ITF_ID_SPI, id) {
            Ok(name) => debug!("{}: {}", name, value),
            Err(e) => error!("Can't get config id name: {}", e),
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let stdout = std::io::stdout();
    session.stream(
        DGI_ITF_ID_SPI,
        &running,
        Duration::from_millis(100),
        |frame| {
            if frame.overflow {
                warn!("SPI data overflow");
            }
            let mut out = stdout.lock();
            let _ = out.write_all(&frame.data);
            let _ = out.flush();
        },
    )?;

    Ok(())
}
