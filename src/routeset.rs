//! Canonical route set construction.
//!
//! A [`RouteSet`] holds normalized networks in the order they are written
//! out: IPv4 before IPv6, then ascending network address, then ascending
//! prefix length. For truncated networks that is exactly `IpNet`'s total
//! order, so a `BTreeSet` keeps the invariant structurally and
//! deduplication falls out of set insertion.

use std::collections::BTreeSet;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use tracing::debug;

use crate::address::AddressSpec;
use crate::error::{VpnRoutesError, Warning};
use crate::resolver::{resolve_spec, HostResolver};
use crate::sources::SourcedSpec;

/// Ordered, deduplicated set of normalized networks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSet {
    nets: BTreeSet<IpNet>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a network, truncating host bits first. Returns false when an
    /// equal network was already present.
    pub fn insert(&mut self, net: IpNet) -> bool {
        self.nets.insert(net.trunc())
    }

    pub fn contains(&self, net: &IpNet) -> bool {
        self.nets.contains(&net.trunc())
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    /// Networks in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &IpNet> {
        self.nets.iter()
    }
}

impl FromIterator<IpNet> for RouteSet {
    fn from_iter<T: IntoIterator<Item = IpNet>>(iter: T) -> Self {
        let mut set = RouteSet::new();
        for net in iter {
            set.insert(net);
        }
        set
    }
}

/// Knobs for [`build`].
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub include_ipv4: bool,
    pub include_ipv6: bool,
    /// Promote unresolved hostnames from warnings to a fatal error.
    pub strict: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            include_ipv4: true,
            include_ipv6: true,
            strict: false,
        }
    }
}

/// Counters surfaced after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// IPv4 networks in the final set.
    pub ipv4: usize,
    /// IPv6 networks in the final set.
    pub ipv6: usize,
    /// Resolved networks dropped as structural duplicates.
    pub duplicates: usize,
    /// Resolved networks dropped by the family filter.
    pub filtered: usize,
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub routes: RouteSet,
    pub warnings: Vec<Warning>,
    pub stats: BuildStats,
}

/// Resolve every spec, append pre-resolved extras, filter by family, and
/// produce the canonical set.
///
/// Family filtering happens after resolution, never instead of it, so the
/// statistics stay accurate whichever families are enabled. An unresolved
/// hostname becomes a [`Warning`] (or a fatal error under strict mode); a
/// fully empty result is valid and only warns.
pub async fn build(
    specs: &[SourcedSpec],
    extra: &[IpNet],
    resolver: &dyn HostResolver,
    options: BuildOptions,
) -> Result<BuildOutcome, VpnRoutesError> {
    if !options.include_ipv4 && !options.include_ipv6 {
        return Err(VpnRoutesError::NoFamiliesEnabled);
    }

    let mut routes = RouteSet::new();
    let mut warnings = Vec::new();
    let mut stats = BuildStats::default();

    for sourced in specs {
        match resolve_spec(&sourced.spec, resolver).await {
            Ok(nets) => {
                for net in nets {
                    admit(net, options, &mut routes, &mut stats);
                }
            }
            Err(err) => {
                let host = match &sourced.spec {
                    AddressSpec::Hostname(host) => host.clone(),
                    AddressSpec::Cidr(net) => net.to_string(),
                };
                if options.strict {
                    return Err(VpnRoutesError::UnresolvedHost {
                        host,
                        reason: err.to_string(),
                    });
                }
                warnings.push(Warning::UnresolvedHost {
                    host,
                    origin: sourced.origin.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    for net in extra {
        admit(*net, options, &mut routes, &mut stats);
    }

    for net in routes.iter() {
        match net {
            IpNet::V4(_) => stats.ipv4 += 1,
            IpNet::V6(_) => stats.ipv6 += 1,
        }
    }

    if routes.is_empty() {
        warnings.push(Warning::EmptyRouteSet);
    }

    debug!(
        "built route set: {} IPv4, {} IPv6, {} duplicates dropped, {} filtered by family",
        stats.ipv4, stats.ipv6, stats.duplicates, stats.filtered
    );

    Ok(BuildOutcome {
        routes,
        warnings,
        stats,
    })
}

fn admit(net: IpNet, options: BuildOptions, routes: &mut RouteSet, stats: &mut BuildStats) {
    let keep = match net {
        IpNet::V4(_) => options.include_ipv4,
        IpNet::V6(_) => options.include_ipv6,
    };
    if !keep {
        stats.filtered += 1;
        return;
    }
    if !routes.insert(net) {
        stats.duplicates += 1;
    }
}

/// Merge adjacent and contained networks into the minimal covering set,
/// per family.
pub fn aggregate(routes: &RouteSet) -> RouteSet {
    let v4: Vec<Ipv4Net> = routes
        .iter()
        .filter_map(|n| match n {
            IpNet::V4(v4) => Some(*v4),
            _ => None,
        })
        .collect();
    let v6: Vec<Ipv6Net> = routes
        .iter()
        .filter_map(|n| match n {
            IpNet::V6(v6) => Some(*v6),
            _ => None,
        })
        .collect();

    Ipv4Net::aggregate(&v4)
        .into_iter()
        .map(IpNet::V4)
        .chain(Ipv6Net::aggregate(&v6).into_iter().map(IpNet::V6))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::SpecOrigin;
    use crate::resolver::MockHostResolver;
    use std::io;

    fn inline(spec: AddressSpec) -> SourcedSpec {
        SourcedSpec {
            spec,
            origin: SpecOrigin::Inline,
        }
    }

    fn cidr(s: &str) -> SourcedSpec {
        inline(s.parse::<AddressSpec>().unwrap())
    }

    fn hostname(s: &str) -> SourcedSpec {
        inline(AddressSpec::Hostname(s.to_string()))
    }

    #[test]
    fn test_canonical_order_network_before_host_route() {
        // 10.0.0.0/24 sorts ahead of 10.0.0.5/32 (lower network address).
        let set: RouteSet = ["10.0.0.5/32", "10.0.0.0/24"]
            .iter()
            .map(|s| s.parse::<IpNet>().unwrap())
            .collect();

        let ordered: Vec<String> = set.iter().map(|n| n.to_string()).collect();
        assert_eq!(ordered, vec!["10.0.0.0/24", "10.0.0.5/32"]);
    }

    #[test]
    fn test_canonical_order_ipv4_before_ipv6() {
        let set: RouteSet = ["2001:db8::/32", "192.0.2.0/24"]
            .iter()
            .map(|s| s.parse::<IpNet>().unwrap())
            .collect();

        let ordered: Vec<String> = set.iter().map(|n| n.to_string()).collect();
        assert_eq!(ordered, vec!["192.0.2.0/24", "2001:db8::/32"]);
    }

    #[test]
    fn test_canonical_order_prefix_breaks_ties() {
        let set: RouteSet = ["10.0.0.0/24", "10.0.0.0/16", "10.0.0.0/8"]
            .iter()
            .map(|s| s.parse::<IpNet>().unwrap())
            .collect();

        let ordered: Vec<String> = set.iter().map(|n| n.to_string()).collect();
        assert_eq!(ordered, vec!["10.0.0.0/8", "10.0.0.0/16", "10.0.0.0/24"]);
    }

    #[test]
    fn test_insert_truncates_and_dedups() {
        let mut set = RouteSet::new();
        assert!(set.insert("10.0.0.77/24".parse().unwrap()));
        assert!(!set.insert("10.0.0.0/24".parse().unwrap()));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&"10.0.0.200/24".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_build_dedups_cidr_and_resolved_host() {
        let mut mock = MockHostResolver::new();
        mock.expect_lookup()
            .returning(|_| Ok(vec!["10.0.0.5".parse().unwrap()]));

        let specs = vec![cidr("10.0.0.5/32"), hostname("example.test")];
        let outcome = build(&specs, &[], &mock, BuildOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(outcome.stats.duplicates, 1);
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_build_order_independent() {
        let mock = MockHostResolver::new();

        let forward = vec![cidr("10.0.0.0/24"), cidr("192.0.2.0/24"), cidr("10.0.0.5")];
        let backward: Vec<SourcedSpec> = forward.iter().rev().cloned().collect();

        let a = build(&forward, &[], &mock, BuildOptions::default())
            .await
            .unwrap();
        let b = build(&backward, &[], &mock, BuildOptions::default())
            .await
            .unwrap();

        assert_eq!(a.routes, b.routes);
    }

    #[tokio::test]
    async fn test_build_family_filter_drops_after_resolution() {
        let mut mock = MockHostResolver::new();
        mock.expect_lookup().returning(|_| {
            Ok(vec![
                "10.0.0.5".parse().unwrap(),
                "2001:db8::5".parse().unwrap(),
            ])
        });

        let options = BuildOptions {
            include_ipv6: false,
            ..BuildOptions::default()
        };
        let outcome = build(&[hostname("example.test")], &[], &mock, options)
            .await
            .unwrap();

        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(outcome.stats.ipv4, 1);
        assert_eq!(outcome.stats.ipv6, 0);
        assert_eq!(outcome.stats.filtered, 1);
    }

    #[tokio::test]
    async fn test_build_unresolved_host_warns_and_continues() {
        let mut mock = MockHostResolver::new();
        mock.expect_lookup()
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "NXDOMAIN")));

        let specs = vec![hostname("gone.example.test"), cidr("10.0.0.0/24")];
        let outcome = build(&specs, &[], &mock, BuildOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            outcome.warnings[0],
            Warning::UnresolvedHost { ref host, .. } if host == "gone.example.test"
        ));
    }

    #[tokio::test]
    async fn test_build_strict_promotes_unresolved_to_error() {
        let mut mock = MockHostResolver::new();
        mock.expect_lookup()
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "NXDOMAIN")));

        let options = BuildOptions {
            strict: true,
            ..BuildOptions::default()
        };
        let err = build(&[hostname("gone.example.test")], &[], &mock, options)
            .await
            .unwrap_err();

        assert!(matches!(err, VpnRoutesError::UnresolvedHost { .. }));
    }

    #[tokio::test]
    async fn test_build_empty_result_warns() {
        let mock = MockHostResolver::new();
        let outcome = build(&[], &[], &mock, BuildOptions::default())
            .await
            .unwrap();

        assert!(outcome.routes.is_empty());
        assert_eq!(outcome.warnings, vec![Warning::EmptyRouteSet]);
    }

    #[tokio::test]
    async fn test_build_rejects_no_families() {
        let mock = MockHostResolver::new();
        let options = BuildOptions {
            include_ipv4: false,
            include_ipv6: false,
            strict: false,
        };
        let err = build(&[], &[], &mock, options).await.unwrap_err();
        assert!(matches!(err, VpnRoutesError::NoFamiliesEnabled));
    }

    #[tokio::test]
    async fn test_build_includes_extra_networks() {
        let mock = MockHostResolver::new();
        let extra = vec![
            "203.0.113.0/24".parse().unwrap(),
            "2001:db8:1::/48".parse().unwrap(),
        ];
        let outcome = build(&[cidr("10.0.0.0/24")], &extra, &mock, BuildOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.routes.len(), 3);
        assert_eq!(outcome.stats.ipv4, 2);
        assert_eq!(outcome.stats.ipv6, 1);
    }

    #[test]
    fn test_aggregate_merges_siblings() {
        let set: RouteSet = ["192.168.0.0/25", "192.168.0.128/25"]
            .iter()
            .map(|s| s.parse::<IpNet>().unwrap())
            .collect();

        let merged = aggregate(&set);
        assert_eq!(merged.len(), 1);
        assert!(merged.contains(&"192.168.0.0/24".parse().unwrap()));
    }

    #[test]
    fn test_aggregate_keeps_disjoint_networks() {
        let set: RouteSet = ["192.168.0.0/24", "10.0.0.0/8", "2001:db8::/32"]
            .iter()
            .map(|s| s.parse::<IpNet>().unwrap())
            .collect();

        let merged = aggregate(&set);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_aggregate_absorbs_contained_host_route() {
        let set: RouteSet = ["10.0.0.0/24", "10.0.0.5/32"]
            .iter()
            .map(|s| s.parse::<IpNet>().unwrap())
            .collect();

        let merged = aggregate(&set);
        assert_eq!(merged.len(), 1);
        assert!(merged.contains(&"10.0.0.0/24".parse().unwrap()));
    }
}
