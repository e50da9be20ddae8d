use approx::assert_relative_eq;
use cadence_graph_core::{topo_order, GraphError, Procedure, ProcedureInputs};
use cadence_test_fixtures::procedures;

fn load(name: &str) -> Procedure {
    let text = procedures::json(name).expect("fixture text");
    Procedure::from_json(&text).expect("fixture parses")
}

#[test]
fn every_fixture_parses_and_sorts() {
    for name in procedures::keys() {
        let proc = load(&name);
        let order = topo_order(&proc.graph.nodes).expect("acyclic fixture");
        assert_eq!(order.len(), proc.graph.nodes.len(), "{name}");
    }
}

#[test]
fn drift_moves_along_x_with_its_default_speed() {
    let drift = load("drift");
    assert_eq!(drift.default_params(), vec![2.0]);
    let out = drift
        .evaluate(&ProcedureInputs {
            position: [1.0, 4.0, -1.0],
            time: 1.5,
            params: &drift.default_params(),
        })
        .expect("evaluate");
    assert_eq!(out, [4.0, 4.0, -1.0]);
}

#[test]
fn bob_clamps_its_amplitude() {
    let bob = load("bob");
    let t = std::f64::consts::FRAC_PI_2;
    let eval = |amp: f64| {
        bob.evaluate(&ProcedureInputs {
            position: [0.0, 1.0, 0.0],
            time: t,
            params: &[amp],
        })
        .expect("evaluate")
    };
    assert_relative_eq!(eval(3.0)[1], 4.0, epsilon = 1e-12);
    assert_relative_eq!(eval(25.0)[1], 11.0, epsilon = 1e-12);
    assert_relative_eq!(eval(-2.0)[1], 1.0, epsilon = 1e-12);
}

#[test]
fn malformed_text_is_a_parse_error() {
    let err = Procedure::from_json("{ \"graph\": 3 }").expect_err("not a graph");
    assert!(matches!(err, GraphError::Parse { .. }));
}
