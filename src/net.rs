//! IP address and CIDR parsing with the arithmetic the pool and rule checks need.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// An address plus prefix length. The address is kept as written, so
/// `10.0.0.1/24` round-trips and [`IpNet::is_strictly_masked`] can report it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IpNet {
    addr: IpAddr,
    prefix: u8,
}

impl IpNet {
    pub fn new(addr: IpAddr, prefix: u8) -> Option<IpNet> {
        if prefix > max_prefix(&addr) {
            return None;
        }
        Some(IpNet { addr, prefix })
    }

    /// Parses `addr/prefix`, or a bare address as a full-length prefix.
    pub fn parse(s: &str) -> Option<IpNet> {
        match s.split_once('/') {
            Some(_) => IpNet::parse_cidr(s),
            None => {
                let addr = parse_ip(s)?;
                let prefix = max_prefix(&addr);
                Some(IpNet { addr, prefix })
            }
        }
    }

    /// Parses `addr/prefix` only; a bare address is rejected.
    pub fn parse_cidr(s: &str) -> Option<IpNet> {
        let (addr, prefix) = s.split_once('/')?;
        if prefix.is_empty() || prefix.len() > 3 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let addr = parse_ip(addr)?;
        let prefix: u8 = prefix.parse().ok()?;
        IpNet::new(addr, prefix)
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix
    }

    pub fn max_prefix_len(&self) -> u8 {
        max_prefix(&self.addr)
    }

    /// 4 or 6.
    pub fn version(&self) -> u8 {
        ip_version(&self.addr)
    }

    /// The network with host bits cleared.
    pub fn network(&self) -> IpNet {
        let width = self.max_prefix_len();
        let bits = to_bits(&self.addr) & mask(width, self.prefix);
        IpNet {
            addr: from_bits(bits, width),
            prefix: self.prefix,
        }
    }

    pub fn is_strictly_masked(&self) -> bool {
        self.network().addr == self.addr
    }

    /// Number of addresses covered, saturating for very large v6 ranges.
    pub fn num_addresses(&self) -> u128 {
        let host_bits = u32::from(self.max_prefix_len() - self.prefix);
        1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        if ip_version(ip) != self.version() {
            return false;
        }
        let m = mask(self.max_prefix_len(), self.prefix);
        to_bits(ip) & m == to_bits(&self.addr) & m
    }

    pub fn overlaps(&self, other: &IpNet) -> bool {
        if self.version() != other.version() {
            return false;
        }
        let shorter = self.prefix.min(other.prefix);
        let m = mask(self.max_prefix_len(), shorter);
        to_bits(&self.addr) & m == to_bits(&other.addr) & m
    }
}

impl fmt::Display for IpNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// Parses a bare IPv4 or IPv6 address.
pub fn parse_ip(s: &str) -> Option<IpAddr> {
    s.parse::<IpAddr>().ok()
}

/// 4 or 6.
pub fn ip_version(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 4,
        IpAddr::V6(_) => 6,
    }
}

fn max_prefix(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn to_bits(ip: &IpAddr) -> u128 {
    match ip {
        IpAddr::V4(v4) => u128::from(u32::from(*v4)),
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

fn from_bits(bits: u128, width: u8) -> IpAddr {
    if width == 32 {
        IpAddr::V4(Ipv4Addr::from(bits as u32))
    } else {
        IpAddr::V6(Ipv6Addr::from(bits))
    }
}

fn mask(width: u8, prefix: u8) -> u128 {
    if prefix == 0 {
        return 0;
    }
    let full = if width == 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    };
    (u128::MAX << u32::from(width - prefix)) & full
}

