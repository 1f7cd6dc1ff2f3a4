//! Unit tests for iso-network.
//!
//! All tests use hand-crafted topologies so they run without any data files.

#[cfg(test)]
mod helpers {
    use iso_core::{GeoPoint, SpeedTable};
    use crate::{Network, Topology};

    /// Two nodes, one directed edge A→B: length 1000, speed 50 → 20 s.
    pub fn single_edge() -> Network {
        let mut t = Topology::new();
        t.add_node(1, GeoPoint::new(0.0, 0.0));
        t.add_node(2, GeoPoint::new(0.01, 0.0));
        t.add_edge(1, 2, 1_000.0, None);
        Network::build(&t, &SpeedTable::uniform(50.0)).unwrap()
    }

    /// Small grid, keys deliberately delivered out of order.
    ///
    /// Nodes (lon, lat):
    ///   10:(0,0)  11:(1,0)  12:(2,0)
    ///   13:(0,1)            14:(2,1)
    ///
    /// Two-way roads: 10-11, 11-12, 10-13, 12-14, 13-14
    pub fn grid() -> (Topology, Network) {
        let mut t = Topology::new();
        t.add_node(14, GeoPoint::new(2.0, 1.0));
        t.add_node(10, GeoPoint::new(0.0, 0.0));
        t.add_node(12, GeoPoint::new(2.0, 0.0));
        t.add_node(11, GeoPoint::new(1.0, 0.0));
        t.add_node(13, GeoPoint::new(0.0, 1.0));

        t.add_road(10, 11, 100.0, Some("primary"));
        t.add_road(11, 12, 100.0, Some("primary"));
        t.add_road(12, 14, 100.0, Some("residential"));
        t.add_road(10, 13, 500.0, Some("service"));
        t.add_road(13, 14, 100.0, None);

        let speeds = SpeedTable::uniform(5.0)
            .with_class("primary", 10.0)
            .with_class("residential", 10.0)
            .with_class("service", 2.0);
        let net = Network::build(&t, &speeds).unwrap();
        (t, net)
    }
}

// ── Build & structure ─────────────────────────────────────────────────────────

#[cfg(test)]
mod build {
    use iso_core::{GeoPoint, NodeId, SpeedTable};
    use crate::{Network, NetworkError, Topology};

    #[test]
    fn empty_build() {
        let net = Network::build(&Topology::new(), &SpeedTable::uniform(1.0)).unwrap();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
    }

    #[test]
    fn base_travel_time_is_length_over_speed() {
        let net = super::helpers::single_edge();
        let edge = net.outgoing_edges(NodeId(0)).next().unwrap();
        assert_eq!(net.travel_time(edge), 20.0);
        let e = net.edge(edge).unwrap();
        assert_eq!(e.speed, 50.0);
        assert_eq!(e.length, 1_000.0);
    }

    #[test]
    fn nodes_sorted_by_key() {
        let (_, net) = super::helpers::grid();
        assert_eq!(net.node_key, vec![10, 11, 12, 13, 14]);
        assert_eq!(net.node_by_key(13), Some(NodeId(3)));
        assert_eq!(net.node_by_key(99), None);
        assert_eq!(net.node_point(NodeId(4)), Some(GeoPoint::new(2.0, 1.0)));
    }

    #[test]
    fn speeds_follow_class() {
        let (_, net) = super::helpers::grid();
        let n10 = net.node_by_key(10).unwrap();
        for e in net.outgoing_edges(n10) {
            let expected = match net.edge_class(e) {
                Some("primary") => 10.0,
                Some("service") => 2.0,
                other => panic!("unexpected class {other:?}"),
            };
            assert_eq!(net.edge(e).unwrap().speed, expected);
        }
        // 13-14 has no class → fallback 5 m/s → 20 s.
        let n13 = net.node_by_key(13).unwrap();
        let n14 = net.node_by_key(14).unwrap();
        let e = net.outgoing_edges(n13).find(|&e| net.edge_to[e.index()] == n14).unwrap();
        assert_eq!(net.travel_time(e), 20.0);
    }

    #[test]
    fn incoming_and_outgoing_edges() {
        let (_, net) = super::helpers::grid();
        let n11 = net.node_by_key(11).unwrap();
        assert_eq!(net.out_degree(n11), 2);
        assert_eq!(net.in_degree(n11), 2);
        for e in net.outgoing_edges(n11) {
            assert_eq!(net.edge_from[e.index()], n11);
        }
        for e in net.incoming_edges(n11) {
            assert_eq!(net.edge_to[e.index()], n11);
        }
        let total_in: usize = net.nodes().map(|n| net.in_degree(n)).sum();
        assert_eq!(total_in, net.edge_count());
    }

    #[test]
    fn parallel_edges_are_kept() {
        let mut t = Topology::new();
        t.add_node(1, GeoPoint::new(0.0, 0.0));
        t.add_node(2, GeoPoint::new(0.0, 0.01));
        t.add_edge(1, 2, 100.0, None);
        t.add_edge(1, 2, 120.0, None);
        let net = Network::build(&t, &SpeedTable::uniform(10.0)).unwrap();
        assert_eq!(net.edge_count(), 2);
        let keys: Vec<u32> = net.outgoing_edges(NodeId(0)).map(|e| net.edge_key[e.index()]).collect();
        assert_eq!(keys, vec![0, 1]);
    }

    #[test]
    fn keyed_edges_advance_auto_keys() {
        let mut t = Topology::new();
        t.add_keyed_edge(1, 2, 3, 100.0, None);
        t.add_edge(1, 2, 100.0, None);
        t.add_edge(2, 1, 100.0, None);
        let keys: Vec<u32> = t.edges.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![3, 4, 0]);
    }

    #[test]
    fn unknown_endpoint_is_malformed() {
        let mut t = Topology::new();
        t.add_node(1, GeoPoint::new(0.0, 0.0));
        t.add_edge(1, 2, 100.0, None);
        let err = Network::build(&t, &SpeedTable::uniform(10.0)).err().unwrap();
        assert!(matches!(err, NetworkError::MalformedTopology(_)));
    }

    #[test]
    fn duplicate_node_key_is_malformed() {
        let mut t = Topology::new();
        t.add_node(1, GeoPoint::new(0.0, 0.0));
        t.add_node(1, GeoPoint::new(1.0, 0.0));
        let err = Network::build(&t, &SpeedTable::uniform(10.0)).err().unwrap();
        assert!(matches!(err, NetworkError::MalformedTopology(_)));
    }

    #[test]
    fn duplicate_parallel_key_is_malformed() {
        let mut t = Topology::new();
        t.add_node(1, GeoPoint::new(0.0, 0.0));
        t.add_node(2, GeoPoint::new(1.0, 0.0));
        t.add_edge(1, 2, 100.0, None);
        let dup = t.edges[0].clone();
        t.edges.push(dup);
        let err = Network::build(&t, &SpeedTable::uniform(10.0)).err().unwrap();
        assert!(matches!(err, NetworkError::MalformedTopology(_)));
    }

    #[test]
    fn negative_length_is_malformed() {
        let mut t = Topology::new();
        t.add_node(1, GeoPoint::new(0.0, 0.0));
        t.add_node(2, GeoPoint::new(1.0, 0.0));
        t.add_edge(1, 2, -5.0, None);
        let err = Network::build(&t, &SpeedTable::uniform(10.0)).err().unwrap();
        assert!(matches!(err, NetworkError::MalformedTopology(_)));
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let mut t = Topology::new();
        t.add_node(1, GeoPoint::new(0.0, 0.0));
        t.add_node(2, GeoPoint::new(1.0, 0.0));
        t.add_edge(1, 2, 100.0, Some("closed"));
        let speeds = SpeedTable::uniform(10.0).with_class("closed", 0.0);
        let err = Network::build(&t, &speeds).err().unwrap();
        assert!(matches!(err, NetworkError::InvalidSpeed { speed, .. } if speed == 0.0));
    }
}

// ── Mutation ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod mutation {
    use iso_core::{EdgeId, NodeId};
    use crate::{AttributeKey, NetworkError, NodeAttribute};

    #[test]
    fn increment_is_additive() {
        let mut net = super::helpers::single_edge();
        net.increment_edge_time(EdgeId(0), 5.0).unwrap();
        assert_eq!(net.travel_time(EdgeId(0)), 25.0);
        net.increment_edge_time(EdgeId(0), 0.0).unwrap();
        assert_eq!(net.travel_time(EdgeId(0)), 25.0);
    }

    #[test]
    fn negative_delta_is_rejected() {
        let mut net = super::helpers::single_edge();
        let err = net.increment_edge_time(EdgeId(0), -1.0).err().unwrap();
        assert!(matches!(err, NetworkError::NegativeDelta { .. }));
        assert!(net.increment_edge_time(EdgeId(0), f64::NAN).is_err());
        assert_eq!(net.travel_time(EdgeId(0)), 20.0);
    }

    #[test]
    fn unknown_edge_is_rejected() {
        let mut net = super::helpers::single_edge();
        let err = net.increment_edge_time(EdgeId(9), 1.0).err().unwrap();
        assert!(matches!(err, NetworkError::UnknownEdge(EdgeId(9))));
    }

    #[test]
    fn attributes_roundtrip() {
        let mut net = super::helpers::single_edge();
        assert_eq!(net.get_node_attribute(NodeId(1), AttributeKey::SiteId), None);
        net.add_node_attribute(NodeId(1), NodeAttribute::SiteId("4321".into())).unwrap();
        net.add_node_attribute(NodeId(1), NodeAttribute::PeakVolume(800.0)).unwrap();
        assert_eq!(
            net.get_node_attribute(NodeId(1), AttributeKey::SiteId),
            Some(NodeAttribute::SiteId("4321".into()))
        );
        assert_eq!(
            net.get_node_attribute(NodeId(1), AttributeKey::PeakVolume),
            Some(NodeAttribute::PeakVolume(800.0))
        );
        assert_eq!(net.get_node_attribute(NodeId(1), AttributeKey::OffpeakVolume), None);
        assert!(net.add_node_attribute(NodeId(7), NodeAttribute::PeakVolume(1.0)).is_err());
    }
}

// ── Nearest-node locator ──────────────────────────────────────────────────────

#[cfg(test)]
mod locator {
    use iso_core::{GeoPoint, NodeId, SpeedTable};
    use crate::{Network, NetworkError, Topology, nearest_node};

    #[test]
    fn exact_position() {
        let (_, net) = super::helpers::grid();
        let n = nearest_node(&net, GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(net.node_key[n.index()], 10);
    }

    #[test]
    fn nearest_by_distance() {
        let (_, net) = super::helpers::grid();
        let near_10 = net.nearest_node(GeoPoint::new(0.4, 0.0)).unwrap();
        assert_eq!(net.node_key[near_10.index()], 10);
        let near_11 = net.nearest_node(GeoPoint::new(0.6, 0.0)).unwrap();
        assert_eq!(net.node_key[near_11.index()], 11);
    }

    #[test]
    fn ties_go_to_lowest_id() {
        let mut t = Topology::new();
        // Two nodes equidistant from the origin, inserted high key first.
        t.add_node(7, GeoPoint::new(0.0, 0.001));
        t.add_node(3, GeoPoint::new(0.0, -0.001));
        let net = Network::build(&t, &SpeedTable::uniform(1.0)).unwrap();
        let n = net.nearest_node(GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(n, NodeId(0));
        assert_eq!(net.node_key[n.index()], 3);
    }

    #[test]
    fn empty_network_errors() {
        let net = Network::build(&Topology::new(), &SpeedTable::uniform(1.0)).unwrap();
        let err = nearest_node(&net, GeoPoint::new(0.0, 0.0)).err().unwrap();
        assert!(matches!(err, NetworkError::EmptyNetwork));
    }

    #[test]
    fn invalid_point_errors() {
        let (_, net) = super::helpers::grid();
        for bad in [
            GeoPoint::new(f64::NAN, 0.0),
            GeoPoint::new(0.0, f64::INFINITY),
            GeoPoint::new(181.0, 0.0),
        ] {
            let err = net.nearest_node(bad).err().unwrap();
            assert!(matches!(err, NetworkError::InvalidPoint(_)));
            assert!(net.k_nearest_nodes(bad, 3).is_empty());
        }
    }

    #[test]
    fn k_nearest_order_and_ties() {
        let (_, net) = super::helpers::grid();
        let nearest = net.k_nearest_nodes(GeoPoint::new(0.0, 0.0), 3);
        let keys: Vec<i64> = nearest.iter().map(|n| net.node_key[n.index()]).collect();
        // 11 is a degree of (scaled) longitude away, 13 a full degree of latitude.
        assert_eq!(keys, vec![10, 11, 13]);
        assert!(net.k_nearest_nodes(GeoPoint::new(0.0, 0.0), 0).is_empty());
        assert_eq!(net.k_nearest_nodes(GeoPoint::new(0.0, 0.0), 50).len(), 5);
    }
}

// ── Delay injection ───────────────────────────────────────────────────────────

#[cfg(test)]
mod delay {
    use iso_core::{EdgeId, GeoPoint, NodeId};
    use crate::{
        AttributeKey, DelayPolicy, DelayRecord, NetworkError, NodeAttribute, NodeAttributes,
        SignalDelay, VolumePeriod, Volumes, inject_delays,
    };
    use crate::delay::DelayModel;

    fn record(site: &str, lon: f64, lat: f64, volumes: Option<(f64, f64)>) -> DelayRecord {
        DelayRecord {
            point:   GeoPoint::new(lon, lat),
            site_id: site.to_owned(),
            volumes: volumes.map(|(offpeak, peak)| Volumes { offpeak, peak }),
        }
    }

    /// 5 s at signals, nothing elsewhere.
    fn five_at_signals() -> DelayPolicy {
        DelayPolicy {
            signalised: SignalDelay::Flat(5.0),
            base_unsignalised_delay: 0.0,
            period: VolumePeriod::Peak,
        }
    }

    #[test]
    fn delay_at_destination_adds_to_incoming_edge() {
        let mut net = super::helpers::single_edge();
        let records = [record("B", 0.01, 0.0, Some((50.0, 100.0)))];
        let report = inject_delays(&mut net, &records, &five_at_signals()).unwrap();
        assert_eq!(net.travel_time(EdgeId(0)), 25.0);
        assert_eq!(report.mappings.len(), 1);
        assert_eq!(report.mappings[0].node, NodeId(1));
        assert_eq!(report.total_delay, 5.0);
        assert_eq!(report.pass, 1);
    }

    #[test]
    fn missing_volumes_default_to_zero() {
        let mut net = super::helpers::single_edge();
        let records = [record("9999", 0.0099, 0.0, None)];
        inject_delays(&mut net, &records, &DelayPolicy::driving()).unwrap();
        assert_eq!(
            net.get_node_attribute(NodeId(1), AttributeKey::OffpeakVolume),
            Some(NodeAttribute::OffpeakVolume(0.0))
        );
        assert_eq!(
            net.get_node_attribute(NodeId(1), AttributeKey::PeakVolume),
            Some(NodeAttribute::PeakVolume(0.0))
        );
        assert_eq!(
            net.get_node_attribute(NodeId(1), AttributeKey::SiteId),
            Some(NodeAttribute::SiteId("9999".into()))
        );
        // Zero volume → unsignalised base delay at both ends: 20 + 10 + 10.
        assert_eq!(net.travel_time(EdgeId(0)), 40.0);
    }

    #[test]
    fn both_endpoints_accumulate() {
        let (_, mut net) = super::helpers::grid();
        let n10 = net.node_by_key(10).unwrap();
        let n11 = net.node_by_key(11).unwrap();
        let e = net.outgoing_edges(n10).find(|&e| net.edge_to[e.index()] == n11).unwrap();
        let before = net.travel_time(e);
        let records = [record("S", 1.0, 0.0, Some((0.0, 4_000.0)))];
        inject_delays(&mut net, &records, &DelayPolicy::driving()).unwrap();
        // 10 s unsignalised at node 10 + min(120, 4000/200)=20 s at node 11.
        assert_eq!(net.travel_time(e), before + 30.0);
    }

    #[test]
    fn saturating_delay_caps() {
        let policy = DelayPolicy::driving();
        let busy = NodeAttributes { peak_volume: Some(100_000.0), ..Default::default() };
        let quiet = NodeAttributes { peak_volume: Some(2_000.0), ..Default::default() };
        assert_eq!(policy.delay(&busy), 120.0);
        assert_eq!(policy.delay(&quiet), 10.0);
        assert_eq!(policy.delay(&NodeAttributes::default()), 10.0);
    }

    #[test]
    fn walking_preset_is_flat() {
        let policy = DelayPolicy::walking();
        let signal = NodeAttributes { peak_volume: Some(1.0), ..Default::default() };
        assert_eq!(policy.delay(&signal), 30.0);
        assert_eq!(policy.delay(&NodeAttributes::default()), 5.0);
    }

    #[test]
    fn offpeak_period_reads_offpeak_volume() {
        let policy = DelayPolicy { period: VolumePeriod::Offpeak, ..DelayPolicy::driving() };
        let attrs = NodeAttributes {
            offpeak_volume: Some(0.0),
            peak_volume: Some(10_000.0),
            ..Default::default()
        };
        assert_eq!(policy.delay(&attrs), 10.0);
    }

    #[test]
    fn travel_times_never_decrease() {
        let (_, mut net) = super::helpers::grid();
        let before: Vec<f64> = (0..net.edge_count()).map(|i| net.travel_time(EdgeId(i as u32))).collect();
        let records = [
            record("A", 0.0, 0.0, Some((10.0, 900.0))),
            record("B", 2.0, 1.0, None),
        ];
        inject_delays(&mut net, &records, &DelayPolicy::driving()).unwrap();
        for (i, b) in before.iter().enumerate() {
            assert!(net.travel_time(EdgeId(i as u32)) >= *b);
        }
    }

    #[test]
    fn order_independent() {
        let records = vec![
            record("100", 1.0, 0.0, Some((5.0, 3_000.0))),
            record("050", 1.0, 0.0001, Some((1.0, 3_000.0))),
            record("200", 0.999, 0.0, Some((9.0, 500.0))),
            record("300", 2.0, 1.0, None),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        let (_, mut a) = super::helpers::grid();
        let (_, mut b) = super::helpers::grid();
        inject_delays(&mut a, &records, &DelayPolicy::driving()).unwrap();
        inject_delays(&mut b, &reversed, &DelayPolicy::driving()).unwrap();

        for n in a.nodes() {
            assert_eq!(a.attributes(n), b.attributes(n));
        }
        for i in 0..a.edge_count() {
            assert_eq!(a.travel_time(EdgeId(i as u32)), b.travel_time(EdgeId(i as u32)));
        }
        // Highest peak volume wins; equal peaks go to the smaller site id.
        let n11 = a.node_by_key(11).unwrap();
        assert_eq!(a.attributes(n11).unwrap().site_id.as_deref(), Some("050"));
    }

    #[test]
    fn second_pass_is_flagged_and_double_counts() {
        let (_, mut net) = super::helpers::grid();
        let records = [record("A", 0.0, 0.0, Some((10.0, 900.0)))];
        inject_delays(&mut net, &records, &DelayPolicy::driving()).unwrap();
        let once = net.total_travel_time();
        assert_eq!(net.delay_passes(), 1);

        let report = inject_delays(&mut net, &records, &DelayPolicy::driving()).unwrap();
        assert_eq!(report.pass, 2);
        assert_eq!(net.delay_passes(), 2);
        assert!(net.total_travel_time() > once);
    }

    #[test]
    fn invalid_policy_rejected_before_mutation() {
        let mut net = super::helpers::single_edge();
        let bad = DelayPolicy {
            signalised: SignalDelay::Saturating { cap: 120.0, divisor: 0.0 },
            ..DelayPolicy::driving()
        };
        let err = inject_delays(&mut net, &[], &bad).err().unwrap();
        assert!(matches!(err, NetworkError::InvalidPolicy(_)));
        assert_eq!(net.travel_time(EdgeId(0)), 20.0);
        assert_eq!(net.delay_passes(), 0);
    }

    #[test]
    fn negative_model_output_leaves_network_untouched() {
        struct Refund;
        impl DelayModel for Refund {
            fn delay(&self, _: &NodeAttributes) -> f64 {
                -3.0
            }
        }
        let mut net = super::helpers::single_edge();
        let err = inject_delays(&mut net, &[], &Refund).err().unwrap();
        assert!(matches!(err, NetworkError::NegativeDelta { .. }));
        assert_eq!(net.travel_time(EdgeId(0)), 20.0);
    }

    #[test]
    fn failed_injection_writes_no_attributes() {
        // Fails only once the record's volumes are visible to the model.
        struct Busy;
        impl DelayModel for Busy {
            fn delay(&self, attrs: &NodeAttributes) -> f64 {
                if attrs.peak_volume.unwrap_or(0.0) > 100.0 { -1.0 } else { 0.0 }
            }
        }
        let mut net = super::helpers::single_edge();
        let records = [record("X", 0.01, 0.0, Some((50.0, 500.0)))];
        let err = inject_delays(&mut net, &records, &Busy).err().unwrap();
        assert!(matches!(err, NetworkError::NegativeDelta { delta, .. } if delta == -1.0));
        assert_eq!(net.attributes(NodeId(1)), Some(&NodeAttributes::default()));
        assert_eq!(net.get_node_attribute(NodeId(1), AttributeKey::SiteId), None);
        assert_eq!(net.travel_time(EdgeId(0)), 20.0);
        assert_eq!(net.delay_passes(), 0);
    }

    #[test]
    fn invalid_record_is_skipped() {
        let mut net = super::helpers::single_edge();
        let records = [record("bad", f64::NAN, 0.0, None), record("ok", 0.0, 0.0, None)];
        let report = inject_delays(&mut net, &records, &DelayPolicy::none()).unwrap();
        assert_eq!(report.skipped_records, 1);
        assert_eq!(report.mappings.len(), 1);
        assert_eq!(report.mappings[0].site_id, "ok");
    }
}
