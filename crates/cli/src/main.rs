//! Fixsim CLI Demo
//!
//! Walks through format growth, rounding modes and overflow modes.
//!
//! Run with: cargo run -p fixsim-cli
//! Set FIXSIM_ROUND_MODE / FIXSIM_OVERFLOW_MODE to change the register modes,
//! and RUST_LOG=fixsim_fixed_point=debug to see overflow events.

use fixsim_fixed_point::{round, FixedConfig, FixedValue, Format, OverflowMode, RoundMode};
use num_bigint::BigInt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fixsim=info,fixsim_fixed_point=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = FixedConfig::from_env()?;
    tracing::info!(
        round_mode = %config.round_mode,
        overflow_mode = %config.overflow_mode,
        "Starting fixsim v{}",
        env!("CARGO_PKG_VERSION")
    );

    println!("=== Fixed-Point Format Growth ===\n");

    let a = FixedValue::builder(3.25)
        .min(-8.0)
        .max(8.0)
        .resolution(0.0625)
        .build()?;
    let b = FixedValue::builder(1.0)
        .min(-8.0)
        .max(8.0)
        .resolution(0.0625)
        .build()?;
    println!("a = {}  raw={}", a.describe(), a.raw());
    println!("b = {}  raw={}", b.describe(), b.raw());

    let sum = a.add(&b)?;
    println!("a + b = {}  raw={}", sum.describe(), sum.raw());
    let diff = a.sub(&b)?;
    println!("a - b = {}  raw={}", diff.describe(), diff.raw());
    let prod = a.mul(&b)?;
    println!("a * b = {}  raw={}", prod.describe(), prod.raw());
    let cube = a.pow(3)?;
    println!("a ** 3 = {}  raw={}", cube.describe(), cube.raw());

    println!("\n=== Rounding Modes (real -> (8, 3, [4])) ===\n");

    let fmt = Format::new(8, 3, 4)?;
    let inputs = [2.53125, -2.53125, 0.96875, -0.03125];
    print!("{:<12}", "mode");
    for x in inputs {
        print!("{:>12}", x);
    }
    println!();
    for mode in RoundMode::ALL {
        print!("{:<12}", mode);
        for x in inputs {
            let raw = round::round_real(x, &fmt, mode)?;
            print!("{:>12}", raw);
        }
        println!();
    }

    println!("\n=== Re-quantization (8, 3, [4]) -> (6, 3, [2]) ===\n");

    let target = Format::new(6, 3, 2)?;
    let raws = [10i64, 14, -10, 9, 11, -9];
    print!("{:<12}", "mode");
    for raw in raws {
        print!("{:>8}", raw);
    }
    println!();
    for mode in RoundMode::ALL {
        print!("{:<12}", mode);
        for raw in raws {
            let out = round::round_fixed(&BigInt::from(raw), &fmt, &target, mode);
            print!("{:>8}", out);
        }
        println!();
    }

    println!("\n=== Overflow Modes (assign 13.5 into (6, 2, [3])) ===\n");

    let big = FixedValue::with_format(13.5, Format::new(10, 5, 4)?, FixedConfig::default())?;
    for mode in OverflowMode::ALL {
        let mut reg = FixedValue::with_format(
            0.0,
            Format::new(6, 2, 3)?,
            config.with_overflow_mode(mode),
        )?;
        reg.assign(&big)?;
        println!("{:<12}{:>12}  raw={}", mode, reg.to_string(), reg.raw());
    }

    println!("\n=== Comparison Alignment ===\n");

    let coarse = FixedValue::from_format(1.5, 5, 2, None)?;
    let fine = FixedValue::from_format(1.5, 7, 2, None)?;
    println!(
        "{} (raw {}) == {} (raw {}): {}",
        coarse.describe(),
        coarse.raw(),
        fine.describe(),
        fine.raw(),
        coarse == fine
    );

    Ok(())
}
