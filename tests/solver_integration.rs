//! Integration tests for the inverse kinematics solvers.
//!
//! Exercises the full stack end to end: DH forward kinematics, rotation
//! conversions, the central-difference Jacobian, and all three solver
//! variants, including the batch and fallback surfaces.

// Allow expect()/unwrap() in test code
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use arm_solver::jacobian;
use arm_solver::kinematics::{DhTable, ForwardKinematics, JointAngles, Pose};
use arm_solver::solver::{
    AnySolver, DampedLeastSquares, GaussNewton, IkSolver, NewtonRaphson, SolverError, SolverKind,
    THIRD_AXIS_CORRECTION,
};

fn model() -> ForwardKinematics {
    ForwardKinematics::new(DhTable::generic_six_axis())
}

/// A well-conditioned reference configuration: elbow bent, wrist off its
/// alignment singularity.
fn reference_joints() -> JointAngles {
    JointAngles::from([0.2, -0.5, 0.4, 0.3, 0.7, -0.2])
}

/// Undo the converged-solution zero-reference correction so the joints can
/// be fed back through forward kinematics.
fn uncorrected(solution: &JointAngles) -> JointAngles {
    let mut joints = *solution;
    joints[2] -= THIRD_AXIS_CORRECTION;
    joints
}

// ============================================================================
// Round trip: fk(q) as target, q as seed
// ============================================================================

#[test]
fn test_round_trip_converges_without_iterating() {
    let model = model();
    let truth = reference_joints();
    let euler_target = Pose::Euler(model.pose_euler(&[], &truth));
    let quat_target = Pose::Quaternion(model.pose_quaternion(&[], &truth));

    let newton = NewtonRaphson::new()
        .solve(&model, &[], &euler_target, &truth)
        .expect("round trip must converge");
    let gauss = GaussNewton::new()
        .solve(&model, &[], &quat_target, &truth)
        .expect("round trip must converge");
    let damped = DampedLeastSquares::new()
        .solve(&model, &[], &euler_target, &truth)
        .expect("round trip must converge");

    for result in [&newton, &gauss, &damped] {
        assert_eq!(result.iterations, 0);
        assert_eq!(result.error_norm, 0.0);
        // Solution equals the seed except for the third-axis correction.
        assert!((uncorrected(&result.joints) - truth).norm() < 1e-12);
    }
}

#[test]
fn test_any_solver_dispatch_round_trip() {
    let model = model();
    let truth = reference_joints();
    // A quaternion target is exact for Gauss-Newton and within conversion
    // rounding for the Euler-space solvers.
    let target = Pose::Quaternion(model.pose_quaternion(&[], &truth));

    for kind in [
        SolverKind::NewtonRaphson,
        SolverKind::GaussNewton,
        SolverKind::DampedLeastSquares,
    ] {
        let solver = AnySolver::new(kind);
        let result = solver
            .solve(&model, &[], &target, &truth)
            .unwrap_or_else(|err| panic!("{kind} failed the round trip: {err}"));
        assert!(result.iterations <= 1, "{kind} took {} iterations", result.iterations);
    }
}

// ============================================================================
// Recovery from a perturbed seed
// ============================================================================

#[test]
fn test_newton_raphson_recovers_perturbed_seed() {
    let model = model();
    let truth = reference_joints();
    let target = Pose::Euler(model.pose_euler(&[], &truth));
    let seed = truth + JointAngles::from([0.03, -0.02, 0.025, 0.015, -0.03, 0.02]);

    let result = NewtonRaphson::new()
        .solve(&model, &[], &target, &seed)
        .expect("newton-raphson should recover a nearby seed");

    assert!(result.iterations >= 1);
    let reached = model.pose_euler(&[], &uncorrected(&result.joints));
    let target = target.to_euler();
    assert!((reached - target).norm() <= 1e-2);
}

#[test]
fn test_gauss_newton_recovers_perturbed_seed() {
    let model = model();
    let truth = reference_joints();
    let target = Pose::Quaternion(model.pose_quaternion(&[], &truth));
    let seed = truth + JointAngles::from([0.02, -0.01, 0.015, 0.01, -0.02, 0.01]);

    let result = GaussNewton::new()
        .solve(&model, &[], &target, &seed)
        .expect("gauss-newton should recover a nearby seed");

    let reached = model.pose_quaternion(&[], &uncorrected(&result.joints));
    assert!((reached - target.to_quaternion()).norm() <= 1e-5);
}

#[test]
fn test_damped_least_squares_recovers_perturbed_seed() {
    let model = model();
    let truth = reference_joints();
    let target = Pose::Euler(model.pose_euler(&[], &truth));
    let seed = truth + JointAngles::from([0.05, -0.04, 0.05, 0.03, -0.05, 0.04]);

    let result = DampedLeastSquares::new()
        .solve(&model, &[], &target, &seed)
        .expect("damped least squares should recover a nearby seed");

    assert!(result.error_norm <= 1e-1);
}

// ============================================================================
// Unreachable targets
// ============================================================================

#[test]
fn test_unreachable_target_exhausts_iterations() {
    let model = model();
    let seed = reference_joints();
    // Far outside the arm's roughly one-meter reach.
    let target = Pose::Euler(arm_solver::kinematics::EulerPose::from([
        5.0, 0.0, 5.0, 0.0, 0.0, 0.0,
    ]));

    // Damping keeps every iteration solvable, so the damped solver runs the
    // full budget and reports it.
    match DampedLeastSquares::new().solve(&model, &[], &target, &seed) {
        Err(SolverError::NonConvergence {
            iterations,
            error_norm,
        }) => {
            assert_eq!(iterations, 150);
            assert!(error_norm > 1.0);
        }
        other => panic!("expected NonConvergence, got {other:?}"),
    }

    // The undamped solvers give up too, either at the cap or on a singular
    // Jacobian along the way.
    assert!(NewtonRaphson::new().solve(&model, &[], &target, &seed).is_err());
    assert!(GaussNewton::new().solve(&model, &[], &target, &seed).is_err());
}

#[test]
fn test_fallback_returns_seed_unchanged() {
    let model = model();
    let seed = reference_joints();
    let target = Pose::Euler(arm_solver::kinematics::EulerPose::from([
        5.0, 0.0, 5.0, 0.0, 0.0, 0.0,
    ]));

    let joints = DampedLeastSquares::new().solve_with_fallback(&model, &[], &target, &seed);

    // The legacy surface hands back the untouched initial guess, with no
    // third-axis correction.
    assert_eq!(joints, seed);
}

// ============================================================================
// Base prefix and batch solving
// ============================================================================

#[test]
fn test_base_prefix_concatenated_in_output() {
    let model = model();
    let truth = reference_joints();
    let base = [0.6];
    let target = Pose::Euler(model.pose_euler(&base, &truth));

    let result = NewtonRaphson::new()
        .solve(&model, &base, &target, &truth)
        .expect("round trip with base prefix must converge");

    let full = result.concatenated(&base);
    assert_eq!(full.len(), 7);
    assert_eq!(full[0], 0.6);
    assert_eq!(&full[1..], result.joints.as_slice());
}

#[test]
fn test_batch_solves_in_request_order() {
    let model = model();
    let configurations = [
        JointAngles::from([0.2, -0.5, 0.4, 0.3, 0.7, -0.2]),
        JointAngles::from([0.4, -0.3, 0.6, 0.1, 0.5, 0.3]),
        JointAngles::from([-0.3, -0.6, 0.2, 0.4, 0.8, -0.1]),
    ];
    let requests: Vec<(Pose, JointAngles)> = configurations
        .iter()
        .map(|joints| (Pose::Euler(model.pose_euler(&[], joints)), *joints))
        .collect();

    let results = NewtonRaphson::new().solve_batch(&model, &[], &requests);

    assert_eq!(results.len(), configurations.len());
    for (result, truth) in results.into_iter().zip(&configurations) {
        let result = result.expect("every batch round trip must converge");
        assert_eq!(result.iterations, 0);
        assert!((uncorrected(&result.joints) - truth).norm() < 1e-12);
    }
}

// ============================================================================
// Jacobian consistency on the real kinematics
// ============================================================================

#[test]
fn test_jacobian_consistent_across_step_sizes() {
    let model = model();
    let joints = reference_joints();
    let f = |q: &JointAngles| model.pose_euler(&[], q);

    let default_step = jacobian::central_difference(f, &joints);
    let coarse_step = jacobian::central_difference_with_step(f, &joints, 1e-6);

    assert!((default_step - coarse_step).norm() < 1e-5);
}
