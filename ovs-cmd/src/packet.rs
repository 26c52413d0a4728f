//! Packet injection with `ovs-ofctl packet-out`.

use std::net::Ipv4Addr;

use ovs_common::constants::{ether_type, BROADCAST_MAC};

use crate::{command::Executor, Error, Ovs, Result};

/// ARP hardware type for Ethernet.
const ARP_HTYPE_ETHERNET: u16 = 1;
/// ARP operation code of a request.
const ARP_OP_REQUEST: u16 = 1;

/// Normalizes a colon separated MAC address to six two-digit lowercase hex octets, e.g.
/// `0:1B:2c:3:4:5` becomes `00:1b:2c:03:04:05`. Returns `None` if it isn't a MAC address.
pub fn normalize_mac(mac: &str) -> Option<String> {
    Some(parse_mac(mac)?.iter().map(|octet| format!("{octet:02x}")).collect::<Vec<_>>().join(":"))
}

fn parse_mac(mac: &str) -> Option<[u8; 6]> {
    let mut octets = [0u8; 6];
    let mut parts = mac.split(':');

    for octet in &mut octets {
        let part = parts.next()?;
        // `from_str_radix` accepts a leading sign.
        if part.is_empty() || part.starts_with(['+', '-']) {
            return None;
        }
        *octet = u8::from_str_radix(part, 16).ok()?;
    }

    parts.next().is_none().then_some(octets)
}

/// A broadcast ARP request ("who has `target_ip`? tell `sender_ip`"), optionally 802.1Q tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpRequest {
    /// Source MAC of the frame and sender hardware address.
    pub sender_mac: [u8; 6],
    pub sender_ip: Ipv4Addr,
    /// The address being resolved.
    pub target_ip: Ipv4Addr,
    /// VLAN ID to tag the frame with. No tag is added if `None`.
    pub vlan_id: Option<u16>,
}

impl ArpRequest {
    pub fn new(sender_mac: [u8; 6], sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self { sender_mac, sender_ip, target_ip, vlan_id: None }
    }

    /// Parses the addresses from their textual forms.
    pub fn parse(sender_mac: &str, sender_ip: &str, target_ip: &str) -> Result<Self> {
        let mac = parse_mac(sender_mac).ok_or_else(|| Error::InvalidMac(sender_mac.to_owned()))?;

        Ok(Self::new(mac, parse_ipv4(sender_ip)?, parse_ipv4(target_ip)?))
    }

    /// Tags the frame with the VLAN ID. An ID of 0 means untagged.
    pub fn vlan(mut self, vlan_id: u16) -> Self {
        self.vlan_id = (vlan_id != 0).then_some(vlan_id);
        self
    }

    /// Returns the Ethernet frame as a hex string, the format `packet-out` takes.
    pub fn to_hex(&self) -> String {
        let broadcast = BROADCAST_MAC.replace(':', "");
        let sender_mac = hex(&self.sender_mac);

        let mut frame = String::with_capacity(2 * 46);
        frame.push_str(&broadcast);
        frame.push_str(&sender_mac);
        if let Some(vlan_id) = self.vlan_id {
            frame.push_str(&format!("{:04x}{vlan_id:04x}", ether_type::VLAN));
        }
        frame.push_str(&format!(
            "{:04x}{ARP_HTYPE_ETHERNET:04x}{:04x}{:02x}{:02x}{ARP_OP_REQUEST:04x}",
            ether_type::ARP,
            ether_type::IPV4,
            6,
            4,
        ));
        frame.push_str(&sender_mac);
        frame.push_str(&hex(&self.sender_ip.octets()));
        // Target hardware address, unknown.
        frame.push_str(&broadcast);
        frame.push_str(&hex(&self.target_ip.octets()));

        frame
    }
}

fn parse_ipv4(input: &str) -> Result<Ipv4Addr> {
    input.parse().map_err(|source| Error::InvalidAddr { input: input.to_owned(), source })
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl<E: Executor> Ovs<E> {
    /// Sends the ARP request through the bridge, as if it was received on `in_port`, applying
    /// `actions` to it (e.g. `output:2`).
    pub fn send_arp_request(
        &self,
        bridge: &str,
        in_port: &str,
        actions: &str,
        request: &ArpRequest,
    ) -> Result<()> {
        let packet = request.to_hex();
        let mut cmd = self.tools.ofctl();
        cmd.args(["packet-out", bridge, in_port, actions, &packet]);

        tracing::debug!(bridge, in_port, actions, ?request, "sending arp request");
        self.execute(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Recorder, Tools};

    #[test]
    fn test_normalize_mac() {
        assert_eq!(normalize_mac("0:1B:2c:3:4:5").as_deref(), Some("00:1b:2c:03:04:05"));
        assert_eq!(normalize_mac("ff:ff:ff:ff:ff:ff").as_deref(), Some(BROADCAST_MAC));
        assert_eq!(normalize_mac("00:11:22:33:44"), None);
        assert_eq!(normalize_mac("00:11:22:33:44:55:66"), None);
        assert_eq!(normalize_mac("00:11:22:33:44:100"), None);
        assert_eq!(normalize_mac("00:11:22:33::55"), None);
        assert_eq!(normalize_mac("00:11:22:33:44:+5"), None);
        assert_eq!(normalize_mac("00-11-22-33-44-55"), None);
    }

    #[test]
    fn test_arp_request_hex() {
        let request = ArpRequest::parse("52:54:00:12:34:56", "10.0.0.1", "10.0.0.2").unwrap();

        assert_eq!(
            request.to_hex(),
            concat!(
                "ffffffffffff",
                "525400123456",
                "0806",
                "0001080006040001",
                "525400123456",
                "0a000001",
                "ffffffffffff",
                "0a000002",
            )
        );
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[]), "");
        assert_eq!(hex(&[0x00, 0x0a, 0xff]), "000aff");
    }

    #[test]
    fn test_arp_request_vlan() {
        let request = ArpRequest::parse("52:54:00:12:34:56", "10.0.0.1", "10.0.0.2").unwrap();

        let tagged = request.vlan(100).to_hex();
        assert_eq!(&tagged[24..32], "81000064");
        assert_eq!(&tagged[32..36], "0806");
        assert_eq!(tagged.len(), request.to_hex().len() + 8);

        assert_eq!(request.vlan(0), request);
    }

    #[test]
    fn test_arp_request_invalid() {
        assert!(matches!(
            ArpRequest::parse("52:54:00:12:34", "10.0.0.1", "10.0.0.2"),
            Err(Error::InvalidMac(_))
        ));
        assert!(matches!(
            ArpRequest::parse("52:54:00:12:34:56", "::1", "10.0.0.2"),
            Err(Error::InvalidAddr { .. })
        ));
        assert!(matches!(
            ArpRequest::parse("52:54:00:12:34:56", "10.0.0.1", "10.0.0"),
            Err(Error::InvalidAddr { .. })
        ));
    }

    #[test]
    fn test_send_arp_request() {
        let ovs = Ovs::with_executor(Tools::default(), Recorder::new());
        let request = ArpRequest::new([2, 0, 0, 0, 0, 1], [192, 168, 1, 1].into(), [192, 168, 1, 2].into());
        ovs.send_arp_request("br0", "LOCAL", "output:1", &request).unwrap();

        assert_eq!(
            ovs.executor().lines(),
            [format!("ovs-ofctl packet-out br0 LOCAL output:1 {}", request.to_hex())]
        );
    }
}
