// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case. Printing results to stdout happens here and nowhere
// else.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CodesArgs, Commands, PlatesArgs, RotateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "plate-forge",
    version = "0.1.0",
    about = "Synthetic licence-plate generation and an MNIST convolutional autoencoder."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)  => run_train(args),
            Commands::Codes(args)  => run_codes(args),
            Commands::Plates(args) => run_plates(args),
            Commands::Rotate(args) => run_rotate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on IDX files in: {}", args.data_dir);
    let summary = TrainUseCase::new(args.into()).execute()?;

    println!("final loss {:.6}", summary.final_test_loss);
    println!(
        "{} steps over {} epochs, best validation loss {:.6}",
        summary.steps, summary.epochs, summary.best_val_loss
    );
    println!("{} weight files written", summary.weight_files);
    println!("run time {:.1}s", summary.elapsed.as_secs_f64());
    Ok(())
}

fn run_codes(args: CodesArgs) -> Result<()> {
    use crate::application::plate_use_case::generate_codes;

    for code in generate_codes(&args.template, args.count, args.seed)? {
        println!("{code}");
    }
    Ok(())
}

fn run_plates(args: PlatesArgs) -> Result<()> {
    use crate::application::plate_use_case::PlateUseCase;

    let out_dir = args.out_dir.clone();
    let records = PlateUseCase::new(args.into()).execute()?;
    println!("Wrote {} plates to '{}'", records.len(), out_dir);
    Ok(())
}

fn run_rotate(args: RotateArgs) -> Result<()> {
    use crate::plate::rotation::euler_matrix;

    let m = euler_matrix(args.yaw, args.pitch, args.roll);
    for row in m.0 {
        println!("[{:>10.6} {:>10.6} {:>10.6}]", row[0], row[1], row[2]);
    }
    let x = m.mul_vec([1.0, 0.0, 0.0]);
    println!("x -> [{:.6}, {:.6}, {:.6}]", x[0], x[1], x[2]);
    Ok(())
}
