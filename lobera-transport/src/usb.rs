//! libusb channel for direct USB connection

use std::time::Duration;

use rusb::{Device, DeviceHandle, GlobalContext};
use tracing::{debug, info};

use crate::device_registry;
use crate::error::TransportError;
use crate::protocol::{request_type, TRANSFER_TIMEOUT_MS};
use crate::types::DeviceInfo;
use crate::ControlChannel;

/// Control-transfer channel to a keyboard on the USB bus
pub struct UsbChannel {
    handle: DeviceHandle<GlobalContext>,
    info: DeviceInfo,
    timeout: Duration,
}

impl UsbChannel {
    /// Open the first supported keyboard found on any bus
    pub fn open_any() -> Result<Self, TransportError> {
        for device in rusb::devices()?.iter() {
            let desc = device.device_descriptor()?;
            if device_registry::is_supported(desc.vendor_id(), desc.product_id()) {
                return Self::open(&device);
            }
        }
        Err(TransportError::DeviceNotFound(format!(
            "no device with vendor id {:04x} and product id in {:04x?}",
            device_registry::VENDOR_ID,
            device_registry::PRODUCT_IDS
        )))
    }

    /// Open a specific USB device
    pub fn open(device: &Device<GlobalContext>) -> Result<Self, TransportError> {
        let handle = device.open()?;
        let info = describe(device, Some(&handle))?;
        info!("Opened {}", info);
        Ok(Self {
            handle,
            info,
            timeout: Duration::from_millis(TRANSFER_TIMEOUT_MS),
        })
    }

    /// Get device information
    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl ControlChannel for UsbChannel {
    fn send(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        let n = self.handle.write_control(
            request_type::VENDOR_OUT,
            request,
            value,
            index,
            payload,
            self.timeout,
        )?;
        debug!("USB OUT 0x{:02X}: {}/{} bytes", request, n, payload.len());
        Ok(n)
    }

    fn receive(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        size: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; size];
        let n = self.handle.read_control(
            request_type::VENDOR_IN,
            request,
            value,
            index,
            &mut buf,
            self.timeout,
        )?;
        debug!("USB IN 0x{:02X}: {}/{} bytes", request, n, size);
        buf.truncate(n);
        Ok(buf)
    }
}

/// List all connected supported keyboards
pub fn list_devices() -> Result<Vec<DeviceInfo>, TransportError> {
    let mut found = Vec::new();
    for device in rusb::devices()?.iter() {
        let desc = device.device_descriptor()?;
        if !device_registry::is_supported(desc.vendor_id(), desc.product_id()) {
            continue;
        }
        // The product string needs an open handle; list the device anyway
        let handle = device.open().ok();
        found.push(describe(&device, handle.as_ref())?);
    }
    Ok(found)
}

fn describe(
    device: &Device<GlobalContext>,
    handle: Option<&DeviceHandle<GlobalContext>>,
) -> Result<DeviceInfo, TransportError> {
    let desc = device.device_descriptor()?;
    let product_name = handle.and_then(|h| h.read_product_string_ascii(&desc).ok());
    Ok(DeviceInfo {
        vid: desc.vendor_id(),
        pid: desc.product_id(),
        bus: device.bus_number(),
        address: device.address(),
        product_name,
    })
}
