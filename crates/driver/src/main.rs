//! Host driver: keeps an attached pad controller configured and its display fed.

mod configuration;
mod frames;
mod midi;
mod usb;

use clap::Parser;
use configuration::Args;
use embassy_time::Instant;
use log::{info, warn};
use std::{
    sync::{Arc, mpsc::RecvTimeoutError},
    time::Duration,
};
use surface_link_lib::{
    identity::Reply,
    palette::SyncEvent,
    surface::{ControlSurface, Handled},
    sysex::SYSEX_START,
};

/// Longest wait for inbound MIDI before palette timeouts are checked.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let output = midi::connect_output(&args.port)?;
    let (_input, inbound) = midi::connect_input(&args.port)?;

    if !args.no_display {
        let display = Arc::new(usb::open_display(args.vendor_id, args.product_id));
        if display.is_available() {
            frames::spawn(display, args.fps);
        }
    }

    let mut surface = ControlSurface::new(output, args.generation.into());
    surface.request_identity()?;
    surface.send_pad_threshold(args.threshold0, args.threshold1, args.pad_settings().sensitivity)?;
    surface.send_velocity_curve(&args.pad_settings())?;
    surface.send_aftertouch_mode(args.aftertouch.into())?;
    surface.send_display_brightness(args.brightness)?;
    surface.send_led_brightness(args.brightness)?;
    surface.request_full_palette(Instant::now())?;

    loop {
        match inbound.recv_timeout(POLL_INTERVAL) {
            Ok(message) if message.first() == Some(&SYSEX_START) => {
                match surface.handle_sysex(Instant::now(), &message)? {
                    Handled::Identity(Reply::Accepted) => info!("Identified {:?}", surface.identity()),
                    Handled::Identity(Reply::Discarded) => warn!("Discarded identity reply {message:02X?}"),
                    Handled::Palette(event) => report(event),
                    Handled::Identity(Reply::NotIdentity) | Handled::Ignored => {}
                }
            }
            Ok(message) => {
                if args
                    .aftertouch_button
                    .is_some_and(|button| midi::is_button_press(&message, button))
                {
                    surface.cycle_aftertouch_mode()?;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        report(surface.poll(Instant::now())?);
    }

    info!("MIDI input closed, exiting");
    Ok(())
}

fn report(event: SyncEvent) {
    match event {
        SyncEvent::Completed { corrections, given_up } => {
            info!("Palette in sync, {corrections} entries corrected, {given_up} given up")
        }
        SyncEvent::Abandoned(index) => warn!("Palette entry {} never answered", u8::from(index)),
        SyncEvent::Resent(index) => info!("Re-requesting palette entry {}", u8::from(index)),
        SyncEvent::Idle | SyncEvent::Waiting => {}
    }
}
