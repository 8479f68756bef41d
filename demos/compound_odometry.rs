//! Dead-reckoning along a circle with uncertain odometry.
//!
//! Every step drives `--step-length` metres forward and turns by 2π/steps, so
//! the robot returns to its starting point. The pose covariance is compounded
//! with both formulas and the position uncertainty is reported along the way.
//!
//! ```bash
//! cargo run --example compound_odometry -- --steps 40 --angular-sigma 0.05
//! ```

use apex_uncertainty::manifold::se3::SE3;
use apex_uncertainty::uncertainty::{CompoundingOrder, SE3Cov};
use apex_uncertainty::{ApexError, ApexResult, init_logger};
use clap::Parser;
use nalgebra::{Matrix6, Vector6};
use std::f64::consts::PI;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "compound_odometry")]
#[command(about = "Compound uncertain odometry along a closed circle")]
struct Args {
    /// Number of odometry increments in the loop
    #[arg(short, long, default_value = "20")]
    steps: usize,

    /// Forward distance of each increment in metres
    #[arg(long, default_value = "1.0")]
    step_length: f64,

    /// Standard deviation of each rotational component per step (rad)
    #[arg(long, default_value = "0.02")]
    angular_sigma: f64,

    /// Standard deviation of each translational component per step (m)
    #[arg(long, default_value = "0.05")]
    linear_sigma: f64,

    /// Print the full pose and covariance after the last step
    #[arg(short, long)]
    verbose: bool,
}

fn validate(args: &Args) -> ApexResult<()> {
    if args.steps == 0 {
        return Err(ApexError::InvalidInput(
            "steps must be at least 1".to_string(),
        ));
    }
    if args.angular_sigma < 0.0 || args.linear_sigma < 0.0 {
        return Err(ApexError::InvalidInput(format!(
            "standard deviations must be non-negative (angular {}, linear {})",
            args.angular_sigma, args.linear_sigma
        )));
    }
    Ok(())
}

fn position_sigma(value: &SE3Cov) -> f64 {
    value
        .covariance()
        .fixed_view::<3, 3>(3, 3)
        .trace()
        .sqrt()
}

fn main() -> ApexResult<()> {
    init_logger();
    let args = Args::parse();
    validate(&args)?;

    let yaw = 2.0 * PI / args.steps as f64;
    let increment = SE3::from_translation_euler(args.step_length, 0.0, 0.0, 0.0, 0.0, yaw);
    let a = args.angular_sigma * args.angular_sigma;
    let l = args.linear_sigma * args.linear_sigma;
    let increment_covariance = Matrix6::from_diagonal(&Vector6::new(a, a, a, l, l, l));
    let step = SE3Cov::new(increment, increment_covariance);

    info!(
        "Compounding {} increments of {:.2} m, σθ = {:.4} rad, σρ = {:.4} m",
        args.steps, args.step_length, args.angular_sigma, args.linear_sigma
    );

    let start = SE3Cov::new(SE3::default(), Matrix6::zeros());
    let mut second = start.clone();
    let mut fourth = start.clone();
    let report_every = (args.steps / 5).max(1);

    for k in 1..=args.steps {
        second = second.compound_2nd_order_with(&step);
        fourth = fourth.compound_4th_order_with(&step);

        if k % report_every == 0 || k == args.steps {
            info!(
                "step {:>4}: position σ {} = {:.5} m, {} = {:.5} m",
                k,
                CompoundingOrder::Second,
                position_sigma(&second),
                CompoundingOrder::Fourth,
                position_sigma(&fourth)
            );
        }
    }

    let chained = start.compound_chain(
        std::iter::repeat_n(&step, args.steps),
        CompoundingOrder::Fourth,
    );
    let drift = (chained.covariance() - fourth.covariance()).norm();
    info!("Loop closure translation error: {:.3e} m", fourth.pose().translation().norm());
    info!("Chain/loop covariance mismatch: {:.3e}", drift);

    for (order, value) in [
        (CompoundingOrder::Second, &second),
        (CompoundingOrder::Fourth, &fourth),
    ] {
        if let Err(err) = value.check_covariance(1e-9) {
            warn!("{} covariance failed sanity check: {}", order, err);
        }
    }

    if args.verbose {
        fourth.print();
    }

    Ok(())
}
