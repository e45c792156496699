// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their flags:
//
//   train   - fit the digit autoencoder
//   codes   - print random plate codes
//   plates  - render plate PNGs from a font
//   rotate  - print a yaw/pitch/roll rotation matrix
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{plate_use_case::PlateJobConfig, train_use_case::TrainConfig};
use crate::domain::symbol::DEFAULT_TEMPLATE;
use crate::plate::compositor::PlateColors;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the convolutional autoencoder on MNIST IDX files
    Train(TrainArgs),

    /// Print random plate codes for a template
    Codes(CodesArgs),

    /// Render synthetic licence plates to PNG files
    Plates(PlatesArgs),

    /// Print the rotation matrix for yaw, pitch and roll (radians)
    Rotate(RotateArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory with the four IDX files (optionally .gz)
    #[arg(long, default_value = "MNIST_data")]
    pub data_dir: String,

    /// Where metrics.csv and sample images go
    #[arg(long, default_value = "MNIST_CNN_autoencoder")]
    pub log_dir: String,

    /// Where the checkpoint and JSON weight dumps go
    #[arg(long, default_value = "weights")]
    pub weights_dir: String,

    /// Number of optimiser steps
    #[arg(long, default_value_t = 5500)]
    pub steps: usize,

    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Width of the bottleneck vector
    #[arg(long, default_value_t = 20)]
    pub latent_size: usize,

    /// Filters per convolution stage
    #[arg(long, default_value_t = 128)]
    pub channels: usize,

    /// Images taken from the head of the training file for validation
    #[arg(long, default_value_t = 5000)]
    pub validation_size: usize,

    #[arg(long, default_value_t = 10)]
    pub validate_every: usize,

    /// Write sample reconstructions every N validations (0 disables)
    #[arg(long, default_value_t = 10)]
    pub image_every: usize,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:        a.data_dir,
            log_dir:         a.log_dir,
            weights_dir:     a.weights_dir,
            steps:           a.steps,
            batch_size:      a.batch_size,
            lr:              a.lr,
            latent_size:     a.latent_size,
            channels:        a.channels,
            validation_size: a.validation_size,
            validate_every:  a.validate_every,
            image_every:     a.image_every,
            seed:            a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct CodesArgs {
    /// Class tags: L letter, D digit, S space, X double, W wide and Q quad space
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    #[arg(long, default_value_t = 10)]
    pub count: usize,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct PlatesArgs {
    /// TrueType/OpenType font used for the glyph atlas
    #[arg(long, default_value = "UKNumberPlate.ttf")]
    pub font: String,

    /// Glyph height in pixels
    #[arg(long, default_value_t = 32)]
    pub font_height: u32,

    #[arg(long, default_value_t = 10)]
    pub count: usize,

    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long, default_value = "plates")]
    pub out_dir: String,

    /// Text colour as hex rrggbb
    #[arg(long, default_value = "00ff00", value_parser = parse_color)]
    pub ink: [f32; 3],

    /// Plate colour as hex rrggbb
    #[arg(long, default_value = "ff0000", value_parser = parse_color)]
    pub background: [f32; 3],
}

impl From<PlatesArgs> for PlateJobConfig {
    fn from(a: PlatesArgs) -> Self {
        PlateJobConfig {
            font_path:   a.font,
            font_height: a.font_height,
            count:       a.count,
            template:    a.template,
            seed:        a.seed,
            out_dir:     a.out_dir,
            colors:      PlateColors { background: a.background, ink: a.ink },
        }
    }
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub yaw: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pitch: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub roll: f64,
}

/// Parse `rrggbb` (optionally `#rrggbb`) into RGB in [0, 1].
pub fn parse_color(s: &str) -> Result<[f32; 3], String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected a colour like 'ff8800', got '{s}'"));
    }
    let mut rgb = [0.0f32; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|e| e.to_string())?;
        *channel = f32::from(byte) / 255.0;
    }
    Ok(rgb)
}
