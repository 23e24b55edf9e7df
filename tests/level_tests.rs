use girder::{
    place_truss, BuildKind, BuildOutcome, BuildTarget, EntityKind, Environment, PhysicsError,
    Terrain, TrussConfig, Vector,
};

fn env() -> Environment {
    Environment::new(9.8, 50.0, 0.0, 500.0).unwrap()
}

fn canyon() -> Terrain {
    Terrain {
        points: vec![
            Vector::new(-1.0, 4.0),
            Vector::new(4.0, 4.0),
            Vector::new(4.0, 0.5),
            Vector::new(12.0, 0.5),
            Vector::new(12.0, 4.0),
            Vector::new(17.0, 4.0),
        ],
        segments: vec![(0, 1), (1, 2), (3, 4), (4, 5)],
        start_nodes: vec![1, 4],
    }
}

#[test]
fn terrain_places_hidden_fixed_nodes_with_visible_anchors() {
    let mut env = env();
    let placed = canyon().place(&mut env).unwrap();
    assert_eq!(placed.nodes.len(), 6);
    assert_eq!(placed.land_beams.len(), 4);
    for (i, id) in placed.nodes.iter().enumerate() {
        let node = env.node(*id).unwrap();
        assert!(node.is_fixed());
        assert_eq!(node.is_visible(), i == 1 || i == 4);
    }
    for id in placed.land_beams.iter() {
        assert_eq!(env.kind((*id).into()), Some(EntityKind::LandBeam));
    }
    assert!(!env.does_bridge_cover(800.0));
}

#[test]
fn deck_across_the_canyon_covers() {
    let mut env = env();
    let placed = canyon().place(&mut env).unwrap();
    let mut from = BuildTarget::Node(placed.nodes[1]);
    for x in [6.0, 8.0, 10.0] {
        let outcome = env.build(BuildKind::Bed, from, Vector::new(x, 4.0).into()).unwrap();
        let BuildOutcome::Link { end, .. } = outcome else {
            panic!("expected a link");
        };
        from = end.into();
    }
    env.build(BuildKind::Bed, from, placed.nodes[4].into()).unwrap();
    assert!(env.does_bridge_cover(800.0));
    assert_eq!(env.bed_nodes().len(), 3);
}

#[test]
fn terrain_segment_with_bad_index_fails() {
    let mut env = env();
    let mut terrain = canyon();
    terrain.segments.push((5, 6));
    assert_eq!(
        terrain.place(&mut env).err(),
        Some(PhysicsError::IndexOutOfBounds { index: 6, count: 6 })
    );
    assert_eq!(env.node_count(), 0);
}

#[test]
fn truss_holds_its_own_weight() {
    let mut env = env();
    let truss = place_truss(&mut env, &TrussConfig::new(Vector::new(8.0, 4.0))).unwrap();
    env.start();
    for _ in 0..120 {
        assert!(!env.update(1.0 / 60.0, 800.0, 500.0));
    }
    for id in truss.beds.iter() {
        assert_eq!(env.constraint(*id).unwrap().break_count(), 0);
    }
}

#[test]
fn deck_load_spreads_over_free_deck_nodes() {
    let mut env = env();
    let truss = place_truss(&mut env, &TrussConfig::new(Vector::new(8.0, 4.0))).unwrap();
    assert_eq!(env.apply_deck_load(300.0), 3);
    for id in &truss.deck[1..4] {
        assert_eq!(env.node(*id).unwrap().body.force(), Vector::new(0.0, -100.0));
    }
    assert_eq!(env.node(truss.deck[0]).unwrap().body.force(), Vector::zero());
}

#[test]
fn wider_truss_scales_member_counts() {
    let mut env = env();
    let config = TrussConfig::new(Vector::new(8.0, 4.0)).with_panels(6).with_panel_size(1.5, 1.0);
    let truss = place_truss(&mut env, &config).unwrap();
    assert_eq!(truss.deck.len(), 7);
    assert_eq!(truss.beds.len(), 6);
    assert_eq!(truss.beams.len(), 6 * 2 + 5);
    assert_eq!(env.validate(), Ok(()));
}
