//! Tests for the change scheduler.

use super::*;

fn node(i: usize) -> ChangeScope {
    ChangeScope::Node(NodeId::new(i))
}

mod severity {
    use super::*;

    #[test]
    fn kinds_are_totally_ordered_with_any_equal_to_structure() {
        let ordered = [
            ChangeKind::Vscroll,
            ChangeKind::Status,
            ChangeKind::Data,
            ChangeKind::Row,
            ChangeKind::Header,
            ChangeKind::Structure,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].severity() < pair[1].severity());
        }
        assert_eq!(ChangeKind::Any.severity(), ChangeKind::Structure.severity());
    }

    #[test]
    fn header_and_scroll_are_always_tree_wide() {
        assert_eq!(
            node(1).normalized(ChangeKind::Header),
            ChangeScope::Tree
        );
        assert_eq!(
            node(1).normalized(ChangeKind::Vscroll),
            ChangeScope::Tree
        );
        assert_eq!(node(1).normalized(ChangeKind::Data), node(1));
    }
}

mod coalescing {
    use super::*;

    #[test]
    fn only_first_request_schedules_a_tick() {
        let mut scheduler = ChangeScheduler::new();

        assert!(scheduler.request_change(ChangeKind::Status, node(1)));
        assert!(!scheduler.request_change(ChangeKind::Data, node(2)));
        assert!(!scheduler.request_change(ChangeKind::Vscroll, ChangeScope::Tree));

        assert_eq!(scheduler.stats().ticks_scheduled, 1);
        assert!(scheduler.is_tick_scheduled());
    }

    #[test]
    fn same_scope_keeps_most_severe_kind() {
        let mut scheduler = ChangeScheduler::new();

        scheduler.request_change(ChangeKind::Status, node(1));
        scheduler.request_change(ChangeKind::Row, node(1));
        scheduler.request_change(ChangeKind::Data, node(1));

        assert_eq!(scheduler.pending(node(1)), Some(ChangeKind::Row));
        assert_eq!(scheduler.pending_len(), 1);
    }

    #[test]
    fn structure_request_plans_a_rebuild() {
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Status, node(1));
        scheduler.request_change(ChangeKind::Structure, node(2));
        scheduler.request_change(ChangeKind::Vscroll, ChangeScope::Tree);

        assert_eq!(scheduler.begin_flush(), Some(FlushPlan::Rebuild));
        scheduler.end_flush();
        assert_eq!(scheduler.stats().rebuilds, 1);
    }

    #[test]
    fn partial_plan_runs_in_ascending_severity() {
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Row, node(3));
        scheduler.request_change(ChangeKind::Status, node(1));
        scheduler.request_change(ChangeKind::Vscroll, ChangeScope::Tree);
        scheduler.request_change(ChangeKind::Data, node(2));

        let plan = scheduler.begin_flush();

        assert_eq!(
            plan,
            Some(FlushPlan::Partial(vec![
                (ChangeScope::Tree, ChangeKind::Vscroll),
                (node(1), ChangeKind::Status),
                (node(2), ChangeKind::Data),
                (node(3), ChangeKind::Row),
            ]))
        );
    }

    #[test]
    fn tree_wide_request_absorbs_lesser_node_requests() {
        let plan = plan_flush(BTreeMap::from([
            (ChangeScope::Tree, ChangeKind::Data),
            (node(1), ChangeKind::Status),
            (node(2), ChangeKind::Row),
        ]));
        assert_eq!(
            plan,
            FlushPlan::Partial(vec![
                (ChangeScope::Tree, ChangeKind::Data),
                (node(2), ChangeKind::Row),
            ])
        );
    }

    #[test]
    fn begin_flush_with_nothing_pending_returns_none() {
        let mut scheduler = ChangeScheduler::new();
        assert_eq!(scheduler.begin_flush(), None);
        assert_eq!(scheduler.stats().flushes, 0);
    }

    #[test]
    fn flush_clears_pending_and_tick() {
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Status, node(1));

        assert!(scheduler.begin_flush().is_some());
        scheduler.end_flush();

        assert_eq!(scheduler.pending_len(), 0);
        assert!(!scheduler.is_tick_scheduled());
        assert_eq!(scheduler.begin_flush(), None);
    }
}

mod reentrancy {
    use super::*;

    #[test]
    fn request_during_flush_waits_for_next_tick() {
        // GIVEN: a flush in progress
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Status, node(1));
        let _plan = scheduler.begin_flush();

        // WHEN: a change is requested mid-flush
        let scheduled = scheduler.request_change(ChangeKind::Data, node(2));

        // THEN: it is not part of the running flush but lands afterwards
        assert!(!scheduled);
        assert_eq!(scheduler.pending(node(2)), None);
        scheduler.end_flush();
        assert_eq!(scheduler.pending(node(2)), Some(ChangeKind::Data));
        assert!(scheduler.is_tick_scheduled());
    }

    #[test]
    fn immediate_during_flush_is_deferred() {
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Status, node(1));
        let _plan = scheduler.begin_flush();

        assert_eq!(scheduler.take_immediate(ChangeKind::Row, node(3)), None);
        scheduler.end_flush();
        assert_eq!(scheduler.pending(node(3)), Some(ChangeKind::Row));
    }
}

mod immediate {
    use super::*;

    #[test]
    fn immediate_drops_subsumed_pending_entry() {
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Status, node(1));
        scheduler.request_change(ChangeKind::Data, node(2));

        let plan = scheduler.take_immediate(ChangeKind::Row, node(1));

        assert_eq!(
            plan,
            Some(FlushPlan::Partial(vec![(node(1), ChangeKind::Row)]))
        );
        assert_eq!(scheduler.pending(node(1)), None);
        assert_eq!(scheduler.pending(node(2)), Some(ChangeKind::Data));
    }

    #[test]
    fn immediate_keeps_more_severe_pending_entry() {
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Row, node(1));

        let _ = scheduler.take_immediate(ChangeKind::Status, node(1));

        assert_eq!(scheduler.pending(node(1)), Some(ChangeKind::Row));
    }

    #[test]
    fn immediate_rebuild_clears_everything_pending() {
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Row, node(1));

        assert_eq!(
            scheduler.take_immediate(ChangeKind::Any, ChangeScope::Tree),
            Some(FlushPlan::Rebuild)
        );
        assert_eq!(scheduler.pending_len(), 0);
    }
}
