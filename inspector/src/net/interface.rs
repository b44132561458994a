use thiserror::Error;

/// Maximum frame size requested from the device. The dump keeps whole
/// frames, the decoder keeps only its own snapshot.
pub const CAPTURE_SNAPLEN: i32 = 65535;

/// Usable interfaces. <br>
/// Necessary: Presence of adresses.
pub fn usable_sorted() -> Result<Vec<pcap::Device>, InterfaceError> {
    let mut interfaces: Vec<pcap::Device> = pcap::Device::list()
        .map_err(InterfaceError::PcapError)?
        .into_iter()
        .filter(|device| !device.addresses.is_empty())
        .collect();

    interfaces.sort_by_key(|device| device.addresses.len());
    interfaces.reverse();

    Ok(interfaces)
}

pub fn get_network_interface_name(network_interface: &pcap::Device) -> String {
    #[cfg(target_os = "windows")]
    let name = if let Some(desc) = &network_interface.desc {
        desc.clone()
    } else {
        network_interface.name.clone()
    };

    #[cfg(not(target_os = "windows"))]
    let name = network_interface.name.clone();

    name
}

/// Get `Device` by its name or description.
pub fn get_network_interface(device_name: &str) -> Result<pcap::Device, InterfaceError> {
    let needed_interface = |device: &pcap::Device| {
        device.name == device_name || device.desc.as_deref() == Some(device_name)
    };

    usable_sorted()?
        .into_iter()
        .find(needed_interface)
        .ok_or_else(|| InterfaceError::UnknownInterface(device_name.to_string()))
}

/// Configured device, or the first usable one.
pub fn resolve(device_name: Option<&str>) -> Result<pcap::Device, InterfaceError> {
    match device_name {
        Some(name) => get_network_interface(name),
        None => usable_sorted()?
            .into_iter()
            .next()
            .ok_or(InterfaceError::NoUsableInterface),
    }
}

/// Opens a live capture. Reads block at most `timeout` milliseconds.
pub fn get_capture(
    device: pcap::Device, timeout: i32,
) -> Result<pcap::Capture<pcap::Active>, InterfaceError> {
    let name = get_network_interface_name(&device);

    let capture = pcap::Capture::from_device(device)
        .map_err(InterfaceError::PcapError)?
        .snaplen(CAPTURE_SNAPLEN)
        .timeout(timeout)
        .immediate_mode(true)
        .open()
        .map_err(InterfaceError::PcapError)?;

    let link_type = capture.get_datalink();
    if link_type != pcap::Linktype::ETHERNET {
        log::warn!(
            "Device {} has link type {:?}, frames are decoded as Ethernet.",
            name,
            link_type
        );
    }
    log::info!("Opened device {}.", name);

    Ok(capture)
}

#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("Pcap Library error.")]
    PcapError(pcap::Error),

    #[error("There are no interfaces with name \"{0}\".")]
    UnknownInterface(String),

    #[error("There are no usable interfaces.")]
    NoUsableInterface,
}

impl InterfaceError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            InterfaceError::PcapError(err) => Some(err.to_string()),
            _ => None,
        }
    }
}
