use girder::{ConstraintKind, Environment, Node, NodeId, Vector};

/// Four 5 m LandBeams spanning x = 0..20 in a 20 px wide view at 1 px/m.
fn land_bridge() -> (Environment, Vec<NodeId>) {
    let mut env = Environment::new(9.8, 1.0, 0.0, 100.0).unwrap();
    let nodes: Vec<NodeId> = (0..=4)
        .map(|i| env.add_node(Node::fixed(Vector::new(5.0 * i as f64, 50.0), 10.0).unwrap()))
        .collect();
    for pair in nodes.windows(2) {
        env.add_constraint(ConstraintKind::LandBeam, pair[0], pair[1], 0.05).unwrap();
    }
    (env, nodes)
}

#[test]
fn continuous_land_bridge_covers() {
    let (env, _) = land_bridge();
    assert!(env.does_bridge_cover(20.0));
}

#[test]
fn removing_middle_segment_breaks_coverage() {
    let (mut env, nodes) = land_bridge();
    let middle = env
        .constraints()
        .find(|(_, c)| c.nodes() == [nodes[2], nodes[3]])
        .map(|(id, _)| id)
        .unwrap();
    env.delete_constraint(middle).unwrap();
    assert!(!env.does_bridge_cover(20.0));
}

#[test]
fn any_beam_link_breaks_coverage() {
    for swapped in 0..4 {
        let mut env = Environment::new(9.8, 1.0, 0.0, 100.0).unwrap();
        let nodes: Vec<NodeId> = (0..=4)
            .map(|i| env.add_node(Node::fixed(Vector::new(5.0 * i as f64, 50.0), 10.0).unwrap()))
            .collect();
        for (i, pair) in nodes.windows(2).enumerate() {
            let kind = if i == swapped { ConstraintKind::Beam } else { ConstraintKind::Bed };
            env.add_constraint(kind, pair[0], pair[1], 0.05).unwrap();
        }
        assert!(!env.does_bridge_cover(20.0), "beam at link {} still covered", swapped);
    }
}

#[test]
fn wider_view_is_not_covered() {
    let (env, _) = land_bridge();
    assert!(!env.does_bridge_cover(25.0));
}

#[test]
fn branching_structure_is_searched() {
    let (mut env, nodes) = land_bridge();
    // dead-end spur off the second node
    let spur = env.add_node(Node::new(Vector::new(5.0, 40.0), 10.0).unwrap());
    env.add_constraint(ConstraintKind::Bed, nodes[1], spur, 0.05).unwrap();
    env.add_constraint(ConstraintKind::Bed, spur, nodes[0], 0.05).unwrap();
    assert!(env.does_bridge_cover(20.0));
}

#[test]
fn deleting_a_node_cascades_to_its_constraints() {
    let (mut env, nodes) = land_bridge();
    env.delete_node(nodes[2]).unwrap();
    assert_eq!(env.constraint_count(), 2);
    assert!(env.node(nodes[1]).unwrap().attachments().len() == 1);
    assert!(!env.does_bridge_cover(20.0));
    assert_eq!(env.validate(), Ok(()));
}
