// ── Switch identity mapping ──
//
// Switches survive a refresh in place, but their names and fixed IPs must
// line up with the incoming naming scheme. Each switch holds an ordinal
// role (first / second), marked by an `SW1` / `SW2` token embedded in its
// name; the role decides both the target name and a deterministic host
// octet. Positional fallback covers fleets that never adopted the
// markers.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use crate::model::{DeviceRecord, MacAddress, VlanConfig};

/// Host octets keyed by ordinal: role 1 gets `.93`, role 2 gets `.89`.
const ORDINAL_HOST_OCTETS: [u8; 2] = [93, 89];

/// A resolved identity for one switch: the name it should carry and the
/// fixed IP it should hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchIdentity {
    pub serial: String,
    pub mac: MacAddress,
    pub name: String,
    pub ip: Ipv4Addr,
    pub ordinal: usize,
}

/// Extract the ordinal role token from a name: `SW1` -> 1, `SW2` -> 2.
fn ordinal_of(name: &str) -> Option<usize> {
    let upper = name.to_uppercase();
    if upper.contains("SW1") {
        Some(1)
    } else if upper.contains("SW2") {
        Some(2)
    } else {
        None
    }
}

/// Resolve the network's host-address base from VLAN 1.
///
/// Prefers the VLAN subnet's network address; falls back to an existing
/// fixed assignment's IP. `None` means the subnet cannot be determined
/// and switch IP assignment must be skipped for safety.
pub fn resolve_subnet_base(vlan: &VlanConfig) -> Option<Ipv4Addr> {
    if let Some(subnet) = vlan.subnet.as_deref() {
        if let Ok(net) = subnet.parse::<Ipv4Net>() {
            return Some(net.network());
        }
    }
    vlan.fixed_ip_assignments
        .values()
        .find_map(|a| a.ip.parse::<Ipv4Addr>().ok())
}

/// Replace the host octet of `base` with `octet`.
fn host_ip(base: Ipv4Addr, octet: u8) -> Ipv4Addr {
    let [a, b, c, _] = base.octets();
    Ipv4Addr::new(a, b, c, octet)
}

/// Map switches to their target identities.
///
/// Marker-based mapping first: a switch whose current name carries an
/// ordinal token is matched to the target name carrying the same token.
/// If no marker pairs up on either side, the first two switches in
/// inventory order take ordinals 1 and 2 positionally, with `SW1`/`SW2`
/// as default names when no targets were supplied.
pub fn map_switch_identities(
    switches: &[DeviceRecord],
    target_names: &[String],
    base: Ipv4Addr,
) -> Vec<SwitchIdentity> {
    let mut out = Vec::new();

    if !target_names.is_empty() {
        for switch in switches {
            let Some(mac) = switch.mac.clone() else {
                continue;
            };
            let Some(ordinal) = switch.name.as_deref().and_then(ordinal_of) else {
                continue;
            };
            let Some(target) = target_names
                .iter()
                .find(|n| ordinal_of(n) == Some(ordinal))
            else {
                continue;
            };
            out.push(SwitchIdentity {
                serial: switch.serial.clone(),
                mac,
                name: target.clone(),
                ip: host_ip(base, ORDINAL_HOST_OCTETS[ordinal - 1]),
                ordinal,
            });
        }
    }

    if out.is_empty() {
        for (i, switch) in switches.iter().take(2).enumerate() {
            let Some(mac) = switch.mac.clone() else {
                continue;
            };
            let ordinal = i + 1;
            let name = target_names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("SW{ordinal}"));
            out.push(SwitchIdentity {
                serial: switch.serial.clone(),
                mac,
                name,
                ip: host_ip(base, ORDINAL_HOST_OCTETS[i]),
                ordinal,
            });
        }
    }

    out
}
