use std::net::IpAddr;

use ipnetwork::IpNetwork;

use crate::types::IpVersion;

/// Canonical `network/prefix` form of a blocks table network field.
///
/// Accepts a CIDR (host bits are cleared), a bare address or a `start-end`
/// range covering exactly one CIDR block. Returns an empty string when the
/// field can't be represented as a single network of `version`.
pub fn ip_range(version: IpVersion, raw: &str) -> String {
    let raw = raw.trim();
    let network = if let Some((start, end)) = raw.split_once('-') {
        range_to_network(start.trim(), end.trim())
    } else if raw.contains('/') {
        raw.parse::<IpNetwork>()
            .ok()
            .and_then(|net| IpNetwork::new(net.network(), net.prefix()).ok())
    } else {
        raw.parse::<IpAddr>().ok().map(IpNetwork::from)
    };

    match network {
        Some(net) if matches_version(&net, version) => net.to_string(),
        _ => String::new(),
    }
}

fn matches_version(net: &IpNetwork, version: IpVersion) -> bool {
    match version {
        IpVersion::V4 => net.is_ipv4(),
        IpVersion::V6 => net.is_ipv6(),
    }
}

fn range_to_network(start: &str, end: &str) -> Option<IpNetwork> {
    let start: IpAddr = start.parse().ok()?;
    let end: IpAddr = end.parse().ok()?;
    match (start, end) {
        (IpAddr::V4(start), IpAddr::V4(end)) => {
            let prefix = block_prefix(u32::from(start) as u128, u32::from(end) as u128, 32)?;
            IpNetwork::new(IpAddr::V4(start), prefix).ok()
        }
        (IpAddr::V6(start), IpAddr::V6(end)) => {
            let prefix = block_prefix(u128::from(start), u128::from(end), 128)?;
            IpNetwork::new(IpAddr::V6(start), prefix).ok()
        }
        _ => None,
    }
}

/// Prefix length of the block `[start, end]`, if it is one aligned block.
fn block_prefix(start: u128, end: u128, bits: u32) -> Option<u8> {
    if end < start {
        return None;
    }
    let host = start ^ end;
    let aligned = host.count_ones() == 128 - host.leading_zeros();
    if !aligned || start & host != 0 {
        return None;
    }
    Some((bits - host.count_ones()) as u8)
}
