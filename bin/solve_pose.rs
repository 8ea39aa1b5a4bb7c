//! Inverse kinematics from the command line.
//!
//! Solves a target end-effector pose for the built-in arm geometry (or a
//! geometry loaded from a TOML file) and prints the resulting joint vector.
//!
//! # Usage
//! ```bash
//! cargo run --release --bin solve_pose -- --target 0.4,0.1,0.5,0.0,0.3,0.0
//!
//! # Quaternion target, Newton-Raphson, custom geometry:
//! cargo run --release --bin solve_pose -- \
//!     --target 0.4,0.1,0.5,1.0,0.0,0.0,0.0 \
//!     --solver newton-raphson --geometry arm.toml
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use arm_solver::init_logger;
use arm_solver::kinematics::{DhTable, ForwardKinematics, JointAngles, Pose};
use arm_solver::solver::{AnySolver, IkSolver, SolverKind};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing::info;

/// Solve a target end-effector pose for a 6-axis arm
#[derive(Parser)]
#[command(name = "solve_pose")]
#[command(about = "Solve a target end-effector pose for a 6-axis arm")]
struct Args {
    /// Target pose: x,y,z,roll,pitch,yaw (6 values) or x,y,z,w,qx,qy,qz (7)
    #[arg(long, value_delimiter = ',', required = true)]
    target: Vec<f64>,

    /// Solver variant
    #[arg(long, value_enum, default_value = "damped-least-squares")]
    solver: SolverArg,

    /// TOML file with a [dh] geometry table (defaults to the built-in arm)
    #[arg(long)]
    geometry: Option<PathBuf>,

    /// Initial guess for the six joints (defaults to all zeros)
    #[arg(long, value_delimiter = ',')]
    seed: Option<Vec<f64>>,

    /// Fixed joint prefix of upstream axes
    #[arg(long, value_delimiter = ',')]
    base: Vec<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SolverArg {
    NewtonRaphson,
    GaussNewton,
    DampedLeastSquares,
}

impl From<SolverArg> for SolverKind {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::NewtonRaphson => SolverKind::NewtonRaphson,
            SolverArg::GaussNewton => SolverKind::GaussNewton,
            SolverArg::DampedLeastSquares => SolverKind::DampedLeastSquares,
        }
    }
}

/// On-disk robot description.
#[derive(Deserialize)]
struct RobotFile {
    dh: DhTable,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logger();
    let args = Args::parse();

    let dh = match &args.geometry {
        Some(path) => {
            let robot: RobotFile = toml::from_str(&std::fs::read_to_string(path)?)?;
            info!(path = %path.display(), "loaded arm geometry");
            robot.dh
        }
        None => DhTable::generic_six_axis(),
    };
    let model = ForwardKinematics::new(dh);

    let target = Pose::from_slice(&args.target)?;
    let seed = match &args.seed {
        Some(values) => {
            if values.len() != 6 {
                return Err(format!("--seed needs 6 values, got {}", values.len()).into());
            }
            JointAngles::from_column_slice(values)
        }
        None => JointAngles::zeros(),
    };

    let kind = SolverKind::from(args.solver);
    let solver = AnySolver::new(kind);

    info!(solver = %kind, ?target, "solving");
    let start = Instant::now();
    let result = solver.solve(&model, &args.base, &target, &seed)?;

    info!(
        iterations = result.iterations,
        error_norm = result.error_norm,
        elapsed = ?start.elapsed(),
        "converged"
    );

    let joints = result.concatenated(&args.base);
    println!(
        "joints: [{}]",
        joints
            .iter()
            .map(|angle| format!("{angle:.6}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
