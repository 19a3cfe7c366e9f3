//! Test pattern pushed to the display at a fixed rate.

use log::{debug, info};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use surface_link_lib::display::{
    BulkEndpoint, Display, FRAME_LEN, FrameStatus, HEIGHT, SOURCE_BYTES_PER_PIXEL, WIDTH,
};

/// Paints a horizontal gradient scrolled `offset` pixels to the left, in B, G, R, A order.
pub fn render_gradient(offset: usize, bitmap: &mut [u8]) {
    for (i, pixel) in bitmap.chunks_exact_mut(SOURCE_BYTES_PER_PIXEL).enumerate() {
        let x = (i % WIDTH + offset) % WIDTH;
        let y = i / WIDTH;
        let shade = (x * 255 / (WIDTH - 1)) as u8;
        pixel.copy_from_slice(&[
            255 - shade,
            (y * 255 / (HEIGHT - 1)) as u8,
            shade,
            0xFF,
        ]);
    }
}

/// Spawns a thread that renders and sends a frame every `1 / fps` seconds, forever.
pub fn spawn<E>(display: Arc<Display<E>>, fps: u32) -> JoinHandle<()>
where
    E: BulkEndpoint + Send + 'static,
{
    let period = Duration::from_secs(1) / fps.max(1);
    info!("Sending frames every {period:?}");
    thread::spawn(move || {
        let mut bitmap = vec![0_u8; FRAME_LEN];
        let mut offset = 0;
        loop {
            let started = Instant::now();
            render_gradient(offset, &mut bitmap);
            if display.send(&bitmap) == FrameStatus::Busy {
                debug!("Frame {offset} dropped");
            }
            offset = (offset + 4) % WIDTH;
            thread::sleep(period.saturating_sub(started.elapsed()));
        }
    })
}
