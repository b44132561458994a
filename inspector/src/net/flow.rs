use dpi::dto::frame::{CapturedFrame, Direction};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// Remote endpoint of a flow: source of inbound frames, destination of
/// outbound ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub address: Ipv4Addr,
    pub port: u16,
}

impl FlowKey {
    /// `None` for frames without an IPv4 layer, they belong to no flow.
    pub fn of(frame: &CapturedFrame) -> Option<Self> {
        let ipv4 = frame.ipv4.as_ref()?;

        let key = match frame.direction {
            Direction::Inbound => Self {
                address: ipv4.address_source,
                port: frame.source_port(),
            },
            Direction::Outbound => Self {
                address: ipv4.address_destination,
                port: frame.destination_port(),
            },
        };

        Some(key)
    }
}

impl Display for FlowKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

pub type Flows = BTreeMap<FlowKey, Vec<CapturedFrame>>;

/// Buckets the frames of one direction by flow key, keeping their order.
pub fn group<'a>(frames: impl IntoIterator<Item = &'a CapturedFrame>, direction: Direction) -> Flows {
    let mut flows = Flows::new();

    for frame in frames {
        if frame.direction != direction {
            continue;
        }
        if let Some(key) = FlowKey::of(frame) {
            flows.entry(key).or_default().push(frame.clone());
        }
    }

    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpi::craft;
    use dpi::craft::config::{CraftConfig, IcmpFields, TransportFields, UdpFields};
    use dpi::dto::frame::FrameHeader;
    use dpi::parser::FrameDecoder;

    fn udp(source: &str, source_port: u16, destination: &str, destination_port: u16, id: i64) -> CapturedFrame {
        let mut config = CraftConfig {
            transport: TransportFields::Udp(UdpFields {
                source_port,
                destination_port,
            }),
            ..Default::default()
        };
        config.ipv4.source = source.to_string();
        config.ipv4.destination = destination.to_string();

        let bytes = craft::craft(&config).unwrap();
        let header = FrameHeader {
            tv_usec: id,
            ..Default::default()
        };
        FrameDecoder::default().decode(&bytes, &header)
    }

    #[test]
    fn test_inbound_grouped_by_source() {
        let frames = vec![
            udp("8.8.8.8", 53, "192.168.1.2", 40000, 1),
            udp("8.8.8.8", 53, "192.168.1.2", 40001, 2),
            udp("1.1.1.1", 53, "192.168.1.2", 40000, 3),
            udp("192.168.1.2", 40000, "8.8.8.8", 53, 4),
        ];

        let flows = group(&frames, Direction::Inbound);

        let google = FlowKey {
            address: Ipv4Addr::new(8, 8, 8, 8),
            port: 53,
        };
        assert_eq!(flows.len(), 2);
        let ids: Vec<i64> = flows[&google].iter().map(|frame| frame.header.tv_usec).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_outbound_grouped_by_destination() {
        let frames = vec![
            udp("192.168.1.2", 40000, "8.8.8.8", 53, 1),
            udp("10.0.0.5", 41000, "8.8.8.8", 53, 2),
            udp("127.0.0.1", 12345, "127.0.0.1", 54321, 3),
        ];

        let flows = group(&frames, Direction::Outbound);

        assert_eq!(flows.len(), 2);
        let loopback = FlowKey {
            address: Ipv4Addr::LOCALHOST,
            port: 54321,
        };
        assert_eq!(flows[&loopback].len(), 1);
        assert_eq!(loopback.to_string(), "127.0.0.1:54321");
    }

    #[test]
    fn test_icmp_flow_has_zero_port() {
        let config = CraftConfig {
            transport: TransportFields::Icmp(IcmpFields::default()),
            ..Default::default()
        };
        let bytes = craft::craft(&config).unwrap();
        let frame = FrameDecoder::default().decode(&bytes, &FrameHeader::default());

        assert_eq!(
            FlowKey::of(&frame),
            Some(FlowKey {
                address: Ipv4Addr::LOCALHOST,
                port: 0
            })
        );
    }

    #[test]
    fn test_frame_without_ipv4_has_no_flow() {
        let frame = FrameDecoder::default().decode(&[0u8; 13], &FrameHeader::default());

        assert_eq!(FlowKey::of(&frame), None);
        assert!(group([&frame], Direction::Outbound).is_empty());
    }
}
