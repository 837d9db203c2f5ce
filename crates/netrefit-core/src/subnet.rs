// ── VLAN 1 subnet planning for template migration ──
//
// After a network is rebound to a different template, the VLAN 1 subnet
// to apply depends on which VLANs the target template itself defines.
// When the template has dropped VLAN 4, its address range is absorbed
// into VLAN 1 by widening the prefix one bit over the pair of original,
// equal-sized blocks (the deployed case: two /27s become one /26).
//
// This is deliberately NOT a general minimal-covering-supernet
// computation. Source blocks of unequal size, or blocks the widened
// prefix cannot cover, are refused rather than guessed at.

use ipnet::Ipv4Net;

use crate::model::VlanConfig;

/// What to do with VLAN 1's subnet after rebinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnetDecision {
    /// Template defines both VLANs; restore VLAN 1's original subnet.
    PreserveOriginal,
    /// Template defines VLAN 1 only; apply this merged subnet and drop
    /// VLAN 4 from the restore set.
    Merged(Ipv4Net),
    /// The topology cannot be resolved safely; skip subnet restoration.
    NotDeterminable(String),
}

/// Decide the VLAN 1 subnet for a network being rebound.
///
/// `has_v1` / `has_v4` reflect the target template's own VLAN structure
/// (queried independently, never inherited from the source network).
pub fn plan_vlan1_subnet(
    has_v1: bool,
    has_v4: bool,
    v1: Option<&VlanConfig>,
    v4: Option<&VlanConfig>,
) -> SubnetDecision {
    if !has_v1 {
        return SubnetDecision::NotDeterminable(
            "template defines no VLAN 1; cannot apply VLAN structure".into(),
        );
    }

    if has_v4 {
        return SubnetDecision::PreserveOriginal;
    }

    // Template absorbed VLAN 4: merge if the source actually had both.
    let (Some(v1), Some(v4)) = (v1, v4) else {
        return SubnetDecision::PreserveOriginal;
    };

    match (parse_subnet(v1), parse_subnet(v4)) {
        (Some(a), Some(b)) => match merge_sibling_blocks(a, b) {
            Some(merged) => SubnetDecision::Merged(merged),
            None => SubnetDecision::NotDeterminable(format!(
                "cannot merge VLAN 1 ({a}) and VLAN 4 ({b}): blocks are not \
                 equal-sized siblings of one wider prefix"
            )),
        },
        _ => SubnetDecision::NotDeterminable(
            "source VLAN 1 or VLAN 4 subnet is missing or unparseable".into(),
        ),
    }
}

fn parse_subnet(vlan: &VlanConfig) -> Option<Ipv4Net> {
    vlan.subnet.as_deref()?.parse().ok()
}

/// Merge two equal-sized blocks into the one-bit-wider block anchored at
/// the lower network address. Returns `None` unless the widened block
/// covers both inputs.
fn merge_sibling_blocks(a: Ipv4Net, b: Ipv4Net) -> Option<Ipv4Net> {
    if a.prefix_len() != b.prefix_len() || a.prefix_len() == 0 {
        return None;
    }
    let start = a.network().min(b.network());
    let merged = Ipv4Net::new(start, a.prefix_len() - 1).ok()?.trunc();
    (merged.contains(&a.network()) && merged.contains(&b.broadcast())).then_some(merged)
}
