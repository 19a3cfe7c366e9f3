//! The display's USB bulk endpoint.

use log::{info, warn};
use rusb::{DeviceHandle, GlobalContext};
use surface_link_lib::display::{BulkEndpoint, Display};

const INTERFACE: u8 = 0;
const ENDPOINT: u8 = 0x01;

/// Bulk OUT endpoint of a claimed display interface.
pub struct UsbEndpoint(DeviceHandle<GlobalContext>);

impl BulkEndpoint for UsbEndpoint {
    type Error = rusb::Error;

    fn write(&mut self, data: &[u8], timeout: embassy_time::Duration) -> Result<usize, Self::Error> {
        self.0
            .write_bulk(ENDPOINT, data, std::time::Duration::from_micros(timeout.as_micros()))
    }
}

/// Opens the display of the device `vendor_id:product_id`, or a [`Display`] that skips every frame if that fails.
pub fn open_display(vendor_id: u16, product_id: u16) -> Display<UsbEndpoint> {
    let Some(mut handle) = rusb::open_device_with_vid_pid(vendor_id, product_id) else {
        warn!("No USB device {vendor_id:04x}:{product_id:04x}");
        return Display::unavailable();
    };
    if let Err(e) = handle.claim_interface(INTERFACE) {
        warn!("Cannot claim display interface: {e}");
        return Display::unavailable();
    }
    info!("Display opened on {vendor_id:04x}:{product_id:04x}");
    Display::new(UsbEndpoint(handle))
}
