//! Property-based checks of the per-step invariants every policy must hold.

use proptest::prelude::*;
use router_qos_sim::config::{ChokeMode, WEIGHTS};
use router_qos_sim::qdisc::{ChokeQdisc, Qdisc, WfqQdisc};
use router_qos_sim::{Packet, PolicyKind, Router, RouterConfig, Scheduler, TrafficClass};

fn class() -> impl Strategy<Value = TrafficClass> {
    prop_oneof![
        Just(TrafficClass::Gold),
        Just(TrafficClass::Silver),
        Just(TrafficClass::Bronze),
    ]
}

fn arrivals(max: usize) -> impl Strategy<Value = Vec<(TrafficClass, u32)>> {
    prop::collection::vec((class(), 1u32..=3), 1..max)
}

fn policy() -> impl Strategy<Value = PolicyKind> {
    prop::sample::select(PolicyKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn occupancy_bounded_and_counts_conserved(
        kind in policy(),
        buffer_size in 1usize..25,
        speed in 0.0f64..=1.0,
        seed in any::<u64>(),
        traffic in arrivals(300),
    ) {
        let cfg = RouterConfig::default()
            .with_buffer_size(buffer_size)
            .with_router_speed(speed)
            .with_seed(seed);
        let mut router = Router::new(kind, &cfg).unwrap();

        for (id, &(class, size)) in traffic.iter().enumerate() {
            router.process_step(Packet::new(id as u64, class, size));
            prop_assert!(router.occupancy() <= buffer_size);
        }
        router.drain();

        let snap = router.snapshot_stats();
        for c in TrafficClass::ALL {
            let expected = traffic.iter().filter(|(k, _)| *k == c).count() as u64;
            prop_assert_eq!(snap.accounted(c), expected);
        }
    }

    #[test]
    fn baseline_drops_only_when_full(
        buffer_size in 1usize..10,
        speed in 0.0f64..=1.0,
        seed in any::<u64>(),
        traffic in arrivals(200),
    ) {
        let cfg = RouterConfig::default()
            .with_buffer_size(buffer_size)
            .with_router_speed(speed)
            .with_seed(seed);
        let mut router = Router::new(PolicyKind::Baseline, &cfg).unwrap();

        for (id, &(class, size)) in traffic.iter().enumerate() {
            let before = router.occupancy();
            let served_before: u64 = TrafficClass::ALL.iter().map(|&c| router.counters(c).served).sum();
            let dropped_before = router.counters(class).dropped;

            router.process_step(Packet::new(id as u64, class, size));

            let served_after: u64 = TrafficClass::ALL.iter().map(|&c| router.counters(c).served).sum();
            let post_service = before - (served_after - served_before) as usize;
            let dropped = router.counters(class).dropped > dropped_before;
            prop_assert_eq!(dropped, post_service == buffer_size);
        }
    }

    #[test]
    fn choke_never_admits_low_classes_while_congested(
        threshold in 1usize..10,
        hysteresis in any::<bool>(),
        ops in prop::collection::vec((class(), any::<bool>()), 1..300),
    ) {
        let mode = if hysteresis { ChokeMode::Hysteresis } else { ChokeMode::Instantaneous };
        let mut q = ChokeQdisc::new(12, threshold, mode);

        for (id, &(class, serve)) in ops.iter().enumerate() {
            if serve {
                q.dequeue();
            }
            let admitted = q.enqueue(Packet::new(id as u64, class, 1)).is_ok();
            if admitted && class != TrafficClass::Gold {
                prop_assert!(!q.is_congested());
            }
            prop_assert!(q.len() <= 12);
        }
    }

    #[test]
    fn token_levels_stay_within_capacity(
        speed in 0.0f64..=1.0,
        seed in any::<u64>(),
        traffic in arrivals(300),
    ) {
        let cfg = RouterConfig::default().with_router_speed(speed).with_seed(seed);
        let mut router = Router::new(PolicyKind::TokenBucket, &cfg).unwrap();

        for (id, &(class, size)) in traffic.iter().enumerate() {
            router.process_step(Packet::new(id as u64, class, size));
            let Scheduler::TokenBucket(q) = router.scheduler() else {
                panic!("expected token bucket scheduler");
            };
            for c in TrafficClass::ALL {
                let bucket = q.bucket(c);
                prop_assert!(bucket.tokens() >= 0.0);
                prop_assert!(bucket.tokens() <= bucket.capacity());
            }
        }
    }

    #[test]
    fn wfq_finish_times_monotone_per_class(
        buffer_size in 1usize..20,
        serve_mask in prop::collection::vec(any::<bool>(), 300),
        traffic in arrivals(300),
    ) {
        let mut q = WfqQdisc::new(buffer_size, WEIGHTS);
        let mut last = [0.0f64; 3];

        for (id, &(class, size)) in traffic.iter().enumerate() {
            if serve_mask[id] {
                q.dequeue();
            }
            let _ = q.enqueue(Packet::new(id as u64, class, size));
            let _ = q.collect_dropped();

            let finish = q.last_finish(class);
            prop_assert!(finish >= last[class.index()]);
            prop_assert!(finish >= id as f64);
            last[class.index()] = finish;
        }
    }

    #[test]
    fn wfq_full_buffer_with_bronze_admits_gold(
        buffer_size in 1usize..10,
        fill in prop::collection::vec(class(), 1..10),
    ) {
        let mut q = WfqQdisc::new(buffer_size, WEIGHTS);
        let mut id = 0u64;
        // 先塞满，保证至少有一个 Bronze
        q.enqueue(Packet::new(id, TrafficClass::Bronze, 1)).unwrap();
        for &class in fill.iter().cycle() {
            if q.len() == buffer_size {
                break;
            }
            id += 1;
            let _ = q.enqueue(Packet::new(id, class, 1));
        }
        prop_assume!(q.occupancy(TrafficClass::Bronze) > 0);

        id += 1;
        prop_assert!(q.enqueue(Packet::new(id, TrafficClass::Gold, 2)).is_ok());
        prop_assert_eq!(q.collect_dropped().len(), 1);
        prop_assert_eq!(q.len(), buffer_size);
    }
}
