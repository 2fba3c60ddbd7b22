//! Tagged layered packets and checksum-aware serialization.

use thiserror::Error;

/// Protocol layer of a header within a packet, outermost first on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Ethernet,
    Ipv6,
    Icmpv6,
    Data,
}

pub const ETHER_HDR_LEN: usize = 14;
pub const IPV6_HDR_LEN: usize = 40;
pub const ICMP6_HDR_LEN: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("ICMPv6 layer without a preceding IPv6 header")]
    MissingIpv6,
    #[error("{0:?} header has wrong length: {1} bytes")]
    BadLayerLength(Layer, usize),
    #[error("Layers out of wire order")]
    LayerOrder,
}

/// An ordered list of `(layer, bytes)` pairs that serializes to one frame.
///
/// The ICMPv6 checksum field of a stored header is always zero; the checksum
/// is computed over the IPv6 pseudo-header at serialization time, so a packet
/// mutated between serializations never emits a stale checksum.
#[derive(Debug, Clone, Default)]
pub struct Packet {
    layers: Vec<(Layer, Vec<u8>)>,
}

impl Packet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer, bytes: Vec<u8>) {
        self.layers.push((layer, bytes));
    }

    /// First layer with the given tag, if any.
    pub fn layer(&self, tag: Layer) -> Option<&[u8]> {
        self.layers
            .iter()
            .find(|(layer, _)| *layer == tag)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn wire_len(&self) -> usize {
        self.layers.iter().map(|(_, bytes)| bytes.len()).sum()
    }

    /// Check the layer invariants without serializing.
    pub fn validate(&self) -> Result<(), PacketError> {
        let mut saw_ipv6 = false;
        let mut saw_icmp = false;
        for (layer, bytes) in &self.layers {
            match layer {
                Layer::Ethernet => {
                    if bytes.len() != ETHER_HDR_LEN {
                        return Err(PacketError::BadLayerLength(*layer, bytes.len()));
                    }
                }
                Layer::Ipv6 => {
                    if bytes.len() != IPV6_HDR_LEN {
                        return Err(PacketError::BadLayerLength(*layer, bytes.len()));
                    }
                    saw_ipv6 = true;
                }
                Layer::Icmpv6 => {
                    if !saw_ipv6 {
                        return Err(PacketError::MissingIpv6);
                    }
                    if bytes.len() != ICMP6_HDR_LEN {
                        return Err(PacketError::BadLayerLength(*layer, bytes.len()));
                    }
                    saw_icmp = true;
                }
                Layer::Data => {
                    if !saw_icmp {
                        return Err(PacketError::LayerOrder);
                    }
                }
            }
        }
        Ok(())
    }

    /// Serialize all layers into a flat wire buffer, computing the ICMPv6
    /// checksum in place.
    pub fn to_wire(&self) -> Result<Vec<u8>, PacketError> {
        self.validate()?;
        let mut out = Vec::with_capacity(self.wire_len());
        let mut ipv6: Option<&[u8]> = None;
        for (i, (layer, bytes)) in self.layers.iter().enumerate() {
            let start = out.len();
            out.extend_from_slice(bytes);
            match layer {
                Layer::Ipv6 => ipv6 = Some(bytes),
                Layer::Icmpv6 => {
                    let ip = ipv6.ok_or(PacketError::MissingIpv6)?;
                    let payload = match self.layers.get(i + 1) {
                        Some((Layer::Data, data)) => data.as_slice(),
                        _ => &[],
                    };
                    let cksum = icmpv6_checksum(ip, bytes, payload);
                    out[start + 2..start + 4].copy_from_slice(&cksum.to_be_bytes());
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

fn sum_words(mut sum: u32, bytes: &[u8]) -> u32 {
    let mut chunks = bytes.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u32::from(u16::from_be_bytes([chunk[0], chunk[1]]));
    }
    // Odd trailing byte is summed as the high byte of a zero-padded word
    if let [last] = chunks.remainder() {
        sum += u32::from(u16::from_be_bytes([*last, 0]));
    }
    sum
}

fn fold(mut sum: u32) -> u16 {
    sum = (sum >> 16) + (sum & 0xffff);
    sum += sum >> 16;
    sum as u16
}

/// Internet one's-complement checksum over the IPv6 pseudo-header (RFC 8200
/// §8.1): source, destination, upper-layer length, next-header, then the
/// ICMPv6 header (checksum field as zero) and payload.
pub fn icmpv6_checksum(ipv6: &[u8], icmp: &[u8], payload: &[u8]) -> u16 {
    let mut sum = sum_words(0, &ipv6[8..40]);
    sum = sum_words(sum, &ipv6[4..6]);
    sum += u32::from(ipv6[6]);
    sum = sum_words(sum, &icmp[..2]);
    sum = sum_words(sum, &icmp[4..]);
    sum = sum_words(sum, payload);
    !fold(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv6_hdr(payload_len: u16) -> Vec<u8> {
        let mut hdr = vec![0u8; IPV6_HDR_LEN];
        hdr[0] = 0x60;
        hdr[4..6].copy_from_slice(&payload_len.to_be_bytes());
        hdr[6] = 58;
        hdr[7] = 255;
        hdr[8] = 0xfe;
        hdr[9] = 0x80;
        hdr[23] = 0x01;
        hdr[24] = 0xff;
        hdr[25] = 0x02;
        hdr[39] = 0x01;
        hdr
    }

    /// One's-complement sum of pseudo-header plus the ICMPv6 message as
    /// emitted (checksum included) folds to 0xFFFF when the checksum is valid.
    fn verify(frame: &[u8]) -> bool {
        let ip = &frame[ETHER_HDR_LEN..ETHER_HDR_LEN + IPV6_HDR_LEN];
        let icmp = &frame[ETHER_HDR_LEN + IPV6_HDR_LEN..];
        let mut sum = sum_words(0, &ip[8..40]);
        sum = sum_words(sum, &ip[4..6]);
        sum += u32::from(ip[6]);
        sum = sum_words(sum, icmp);
        fold(sum) == 0xffff
    }

    fn sample(payload: Vec<u8>) -> Packet {
        let mut pkt = Packet::new();
        let mut eth = vec![0u8; ETHER_HDR_LEN];
        eth[12] = 0x86;
        eth[13] = 0xdd;
        pkt.push(Layer::Ethernet, eth);
        pkt.push(
            Layer::Ipv6,
            ipv6_hdr((ICMP6_HDR_LEN + payload.len()) as u16),
        );
        pkt.push(Layer::Icmpv6, vec![136, 0, 0, 0, 0x20, 0, 0, 0]);
        pkt.push(Layer::Data, payload);
        pkt
    }

    #[test]
    fn test_checksum_folds_to_ffff() {
        let frame = sample(vec![1, 2, 3, 4, 5, 6, 7, 8]).to_wire().unwrap();
        assert!(verify(&frame));
    }

    #[test]
    fn test_checksum_odd_payload() {
        let frame = sample(vec![0xab, 0xcd, 0xef]).to_wire().unwrap();
        assert!(verify(&frame));
    }

    #[test]
    fn test_stored_checksum_stays_zero() {
        let pkt = sample(vec![9; 16]);
        let first = pkt.to_wire().unwrap();
        assert_eq!(pkt.layer(Layer::Icmpv6).unwrap()[2..4], [0, 0]);
        let second = pkt.to_wire().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_icmp_without_ipv6_rejected() {
        let mut pkt = Packet::new();
        pkt.push(Layer::Icmpv6, vec![0u8; ICMP6_HDR_LEN]);
        assert_eq!(pkt.to_wire(), Err(PacketError::MissingIpv6));
    }

    #[test]
    fn test_bad_header_length_rejected() {
        let mut pkt = Packet::new();
        pkt.push(Layer::Ethernet, vec![0u8; 10]);
        assert!(matches!(
            pkt.validate(),
            Err(PacketError::BadLayerLength(Layer::Ethernet, 10))
        ));
    }

    #[test]
    fn test_wire_len_matches_output() {
        let pkt = sample(vec![0; 24]);
        assert_eq!(pkt.wire_len(), pkt.to_wire().unwrap().len());
    }
}
