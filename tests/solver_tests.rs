use pdp_routing::distance::DistanceMatrix;
use pdp_routing::evaluation::FeasibilityEvaluator;
use pdp_routing::local_search::two_opt_improve;
use pdp_routing::models::{
    InfeasibilityCause, Instance, Request, Route, SolveError, StructuralDefect, TimeWindow,
    ViolationType,
};
use pdp_routing::solver::{Budget, Solver, SolverConfig, SolverState};

fn fixture(name: &str) -> Instance {
    let path = format!("{}/tests/fixtures/{name}.json", env!("CARGO_MANIFEST_DIR"));
    let text = std::fs::read_to_string(&path).expect("fixture exists");
    serde_json::from_str(&text).expect("fixture is a valid instance")
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn test_basic_instance() {
    let inst = fixture("basic");
    let solution = pdp_routing::solve(&inst).expect("feasible");

    assert_eq!(solution.constructed().nodes(), &[0, 1, 2, 3, 4]);
    assert_close(solution.constructed_distance(), 13.0);
    assert_eq!(solution.improved(), solution.constructed());
    assert_eq!(solution.improvement().moves, 0);

    // Improving the result again is a no-op.
    let evaluator = FeasibilityEvaluator::new(&inst);
    let config = SolverConfig::default();
    let budget = Budget::new(&config);
    let (again, stats) = two_opt_improve(solution.improved(), &evaluator, &config, &budget);
    assert_eq!(&again, solution.improved());
    assert_eq!(stats.moves, 0);
}

#[test]
fn test_tight_windows_schedule() {
    let inst = fixture("tight_windows");
    let solution = pdp_routing::solve(&inst).expect("feasible");
    assert_eq!(solution.improved().nodes(), &[0, 1, 2, 3, 4]);

    let evaluator = FeasibilityEvaluator::new(&inst);
    let visits = evaluator.schedule(solution.improved()).expect("feasible");
    let starts: Vec<f64> = visits.iter().map(|v| v.service_start).collect();
    assert_eq!(starts, vec![0.0, 1.0, 4.0, 6.0, 10.0]);
    // Node 4 opens at 10: the vehicle arrives at 9 and waits.
    assert_close(visits[4].arrival_time, 9.0);
}

#[test]
fn test_paired_non_contiguous_ids() {
    let inst = fixture("paired");
    let solution = pdp_routing::solve(&inst).expect("feasible");
    let route = solution.improved();
    assert_eq!(route.nodes(), &[0, 1, 2, 5, 6, 7, 8]);
    assert_close(solution.improved_distance(), 13.0);

    // Both pickups of the group precede either delivery.
    let last_pickup = route.position_of(1).max(route.position_of(2));
    let first_delivery = route.position_of(6).min(route.position_of(7));
    assert!(last_pickup < first_delivery);
}

#[test]
fn test_pairing_rejects_cheaper_order() {
    let inst = fixture("paired");
    let evaluator = FeasibilityEvaluator::new(&inst);

    // Delivering request 1 before request 2 is picked up breaks the group.
    let cheap = [0, 1, 6, 2, 7, 5, 8];
    let err = evaluator.check(&cheap).unwrap_err();
    assert_eq!(err.position, 2);
    assert_eq!(
        err.kind,
        ViolationType::PairingViolated {
            node: 6,
            request: 1,
            missing: 2
        }
    );
}

#[test]
fn test_paired_tight_windows() {
    let inst = fixture("paired_tight");
    let solution = pdp_routing::solve(&inst).expect("feasible");
    assert_eq!(solution.improved().nodes(), &[0, 1, 2, 3, 6, 5, 4]);
    assert_close(solution.improved_distance(), 12.0);
    let evaluator = FeasibilityEvaluator::new(&inst);
    assert!(evaluator.is_feasible(solution.improved().nodes()));
}

#[test]
fn test_delivery_window_before_pickup_is_infeasible() {
    let inst = Instance::builder(vec![0, 1, 2], 0)
        .with_distances(
            DistanceMatrix::from_rows(vec![
                vec![0.0, 1.0, 1.0],
                vec![1.0, 0.0, 1.0],
                vec![1.0, 1.0, 0.0],
            ])
            .expect("square"),
        )
        .with_request(Request::new(1, 1, 2))
        .with_time_window(1, TimeWindow::new(10.0, 15.0))
        .with_time_window(2, TimeWindow::new(0.0, 2.0))
        .build()
        .expect("valid");

    let mut solver = Solver::new(&inst, SolverConfig::default());
    let err = solver.solve().unwrap_err();
    assert_eq!(solver.state(), SolverState::Infeasible);

    let SolveError::Infeasible(inf) = err else {
        panic!("expected infeasibility, got {err:?}");
    };
    assert_eq!(inf.unserved, vec![1]);
    match inf.cause {
        InfeasibilityCause::StructurallyInvalid(defects) => {
            assert!(matches!(
                defects.as_slice(),
                [StructuralDefect::UnservableRequest { request: 1, .. }]
            ));
        }
        other => panic!("expected a structural defect, got {other:?}"),
    }
}

#[test]
fn test_single_request_round_trip() {
    let dm = DistanceMatrix::from_rows(vec![
        vec![0.0, 4.0, 5.0],
        vec![4.0, 0.0, 3.0],
        vec![5.0, 3.0, 0.0],
    ])
    .expect("square");

    let closed = Instance::builder(vec![0, 1, 2], 0)
        .with_end(0)
        .with_distances(dm.clone())
        .with_request(Request::new(7, 1, 2))
        .build()
        .expect("valid");
    let solution = pdp_routing::solve(&closed).expect("feasible");
    assert_eq!(solution.constructed().nodes(), &[0, 1, 2, 0]);
    assert_close(solution.improved_distance(), 12.0);

    let open = Instance::builder(vec![0, 1, 2], 0)
        .with_distances(dm)
        .with_request(Request::new(7, 1, 2))
        .build()
        .expect("valid");
    let solution = pdp_routing::solve(&open).expect("feasible");
    assert_eq!(solution.constructed().nodes(), &[0, 1, 2]);
    assert_close(solution.improved_distance(), 7.0);
}

#[test]
fn test_shared_delivery_node() {
    // Two requests deliver to node 3.
    let inst = Instance::builder(vec![0, 1, 2, 3], 0)
        .with_distances(
            DistanceMatrix::from_rows(vec![
                vec![0.0, 1.0, 2.0, 3.0],
                vec![1.0, 0.0, 1.0, 2.0],
                vec![2.0, 1.0, 0.0, 1.0],
                vec![3.0, 2.0, 1.0, 0.0],
            ])
            .expect("square"),
        )
        .with_request(Request::new(1, 1, 3))
        .with_request(Request::new(2, 2, 3))
        .build()
        .expect("valid");

    let solution = pdp_routing::solve(&inst).expect("feasible");
    let route = solution.improved().nodes();
    assert_eq!(route.iter().filter(|&&n| n == 3).count(), 2);
    let evaluator = FeasibilityEvaluator::new(&inst);
    assert!(evaluator.is_feasible(route));
}

#[test]
fn test_no_requests() {
    let dm = DistanceMatrix::from_rows(vec![vec![0.0, 5.0], vec![5.0, 0.0]])
        .expect("square");
    let inst = Instance::builder(vec![0, 1], 0)
        .with_end(1)
        .with_distances(dm)
        .build()
        .expect("valid");
    let solution = pdp_routing::solve(&inst).expect("feasible");
    assert_eq!(solution.improved(), &Route::from(vec![0, 1]));
    assert_close(solution.improved_distance(), 5.0);
}

#[test]
fn test_config_from_json() {
    let json = r#"{ "parallel": true, "max_improvement_passes": 3 }"#;
    let config: SolverConfig = serde_json::from_str(json).expect("valid config");
    assert!(config.parallel);
    assert_eq!(config.max_improvement_passes, Some(3));

    let inst = fixture("paired_tight");
    let parallel = Solver::new(&inst, config).solve().expect("feasible");
    let sequential = pdp_routing::solve(&inst).expect("feasible");
    assert_eq!(parallel.improved(), sequential.improved());
}
