use approx::assert_abs_diff_eq;
use orbital_core::layout::{compute_position, LayoutConfig, Viewport};
use orbital_core::model::{load_seed, Ancestry, NodeId, NodeKind, ParentRef, PointF};
use orbital_core::session::MapSession;
use proptest::prelude::*;

const SEED: &str = r#"[
    { "id": "sun", "type": "sun", "name": "Company Vision", "progress": 45 },
    { "id": "strategy", "type": "planet", "parentId": "center", "orbit": 180, "budget": 1000, "spent": 250 },
    { "id": "product", "type": "planet", "parentId": "center", "orbit": 280 },
    { "id": "ops", "type": "planet", "parentId": "center", "orbit": 380 },
    { "id": "roadmap", "type": "moon", "parentId": "strategy", "orbit": 60 },
    { "id": "pricing", "type": "moon", "parentId": "roadmap", "orbit": 40 },
    { "id": "hiring", "type": "moon", "parentId": "ops", "orbit": 60 }
]"#;

fn session() -> MapSession {
    let nodes = load_seed(SEED).unwrap();
    MapSession::new(nodes, Viewport::new(1600.0, 1200.0), LayoutConfig::default()).unwrap()
}

fn position(s: &MapSession, id: &str) -> PointF {
    let node = s.nodes().get(&NodeId::from(id)).unwrap();
    compute_position(node, s.nodes(), &s.frame(), s.config())
}

fn assert_well_formed(s: &MapSession) {
    s.nodes().validate().unwrap();
    for n in s.nodes().iter() {
        assert!(matches!(s.nodes().ancestry(n), Ancestry::Chain(_)), "{} lost its chain", n.id);
    }
}

#[test]
fn test_drag_planet_then_break_moon_free() {
    let mut s = session();

    // product onto strategy: strategy already has one moon
    let target = position(&s, "strategy");
    s.pointer_down(&NodeId::from("product")).unwrap();
    s.pointer_move(PointF::new(target.x + 30.0, target.y));
    let m = s.pointer_up(PointF::new(target.x + 30.0, target.y)).unwrap().unwrap();
    assert_eq!(m.kind, NodeKind::Moon);
    assert_eq!(m.parent_id, ParentRef::Node(NodeId::from("strategy")));
    assert_abs_diff_eq!(m.orbit, 90.0);
    assert_well_formed(&s);

    // pull it far away again: two planets remain
    let anchor = position(&s, "strategy");
    s.pointer_down(&NodeId::from("product")).unwrap();
    let m = s.pointer_up(PointF::new(anchor.x + 500.0, anchor.y)).unwrap().unwrap();
    assert_eq!(m.kind, NodeKind::Planet);
    assert_eq!(m.parent_id, ParentRef::Root);
    assert_abs_diff_eq!(m.orbit, 380.0);
    assert_well_formed(&s);
}

#[test]
fn test_strategy_cannot_snap_under_its_own_moons() {
    let mut s = session();
    for target in ["roadmap", "pricing"] {
        let at = position(&s, target);
        s.pointer_down(&NodeId::from("strategy")).unwrap();
        assert_eq!(s.pointer_up(at).unwrap(), None);
    }
    assert_eq!(s.nodes().get(&NodeId::from("strategy")).unwrap().kind, NodeKind::Planet);
}

#[test]
fn test_delete_rehomes_children() {
    let mut s = session();
    s.delete_node(&NodeId::from("roadmap")).unwrap();
    let pricing = s.nodes().get(&NodeId::from("pricing")).unwrap();
    assert_eq!(pricing.parent_id, ParentRef::Node(NodeId::from("strategy")));
    assert_eq!(pricing.kind, NodeKind::Moon);

    s.delete_node(&NodeId::from("ops")).unwrap();
    let hiring = s.nodes().get(&NodeId::from("hiring")).unwrap();
    assert_eq!(hiring.parent_id, ParentRef::Root);
    assert_eq!(hiring.kind, NodeKind::Planet);
    assert_well_formed(&s);
}

#[test]
fn test_snapshot_json_shape() {
    let mut s = session();
    s.select(Some(&NodeId::from("strategy"))).unwrap();
    let json = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(json["nodes"].as_array().unwrap().len(), 7);
    assert_eq!(json["orbits"].as_array().unwrap().len(), 6);
    assert_eq!(json["selection"]["budgetUtilization"], 25);
    assert_eq!(json["selection"]["node"]["parentId"], "center");
    assert!(json.get("error").is_none());
}

proptest! {
    #[test]
    fn prop_random_drags_keep_tree_valid(
        drags in proptest::collection::vec((0..7usize, 0..7usize, -250.0..250.0f64, -250.0..250.0f64), 1..30)
    ) {
        let mut s = session();
        let ids: Vec<NodeId> = s.nodes().iter().map(|n| n.id.clone()).collect();
        for (dragged, target, dx, dy) in drags {
            let at = position(&s, ids[target].as_str());
            let cursor = PointF::new(at.x + dx, at.y + dy);
            s.pointer_down(&ids[dragged]).unwrap();
            s.pointer_move(cursor);
            s.pointer_up(cursor).unwrap();

            prop_assert!(s.nodes().validate().is_ok());
            prop_assert_eq!(s.nodes().len(), 7);
            for n in s.nodes().iter() {
                prop_assert!(matches!(s.nodes().ancestry(n), Ancestry::Chain(_)));
            }
            prop_assert_eq!(s.nodes().get(&NodeId::from("sun")).unwrap().kind, NodeKind::Sun);
        }
    }
}
