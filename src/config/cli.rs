use crate::domain::model::{BufferKind, GeoPoint};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "courier")]
#[command(about = "Delivery ETA estimates and VIN validation/decoding")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Great-circle distance between two points
    Distance {
        /// Start point as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        from: GeoPoint,
        /// End point as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        to: GeoPoint,
    },

    /// Estimated arrival from the current position to a destination
    Eta {
        #[arg(allow_hyphen_values = true)]
        from: GeoPoint,
        #[arg(allow_hyphen_values = true)]
        to: GeoPoint,
        #[arg(long, value_enum, default_value = "none")]
        buffer: BufferKind,
    },

    /// Driver -> pickup -> delivery estimate
    Trip {
        #[arg(allow_hyphen_values = true)]
        driver: GeoPoint,
        #[arg(allow_hyphen_values = true)]
        pickup: GeoPoint,
        #[arg(allow_hyphen_values = true)]
        delivery: GeoPoint,
    },

    /// Replay a driver track and re-estimate the ETA on every point
    Watch {
        /// CSV file with "lat,lng" columns
        #[arg(long)]
        track: PathBuf,
        /// Destination as "lat,lng"
        #[arg(long, allow_hyphen_values = true)]
        dest: GeoPoint,
        #[arg(long, default_value = "order")]
        order_id: String,
        #[arg(long, value_enum, default_value = "delivery")]
        buffer: BufferKind,
        /// Seconds between points, overrides the configuration
        #[arg(long)]
        interval: Option<u64>,
    },

    /// VIN tools
    #[command(subcommand)]
    Vin(VinCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum VinCommand {
    /// Validate structure and check digit
    Check { vin: String },

    /// Decode make, model and year
    Decode {
        vin: String,
        /// Use only the built-in tables
        #[arg(long)]
        offline: bool,
    },

    /// Clean up typed or scanned text into a VIN
    Cleanup { text: String },

    /// Find VIN candidates in OCR text (file or stdin)
    Scan {
        /// Text file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Pick the VIN agreed on by several scans
    Consensus {
        #[arg(required = true)]
        readings: Vec<String>,
    },

    /// Check a single-character correction of a scanned VIN
    Edit { original: String, edited: String },

    /// Decode every VIN in a CSV file
    Batch {
        #[arg(long)]
        input: PathBuf,
        /// Output CSV; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        offline: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eta_command() {
        let cli = Cli::try_parse_from([
            "courier",
            "eta",
            "25.2854,51.5310",
            "25.3548,51.1839",
            "--buffer",
            "pickup",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Eta { from, buffer, .. } => {
                assert_eq!(from.lat, 25.2854);
                assert_eq!(buffer, BufferKind::Pickup);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_negative_coordinates() {
        let cli = Cli::try_parse_from(["courier", "distance", "-33.86,151.2", "-37.81,144.96"]).unwrap();
        assert!(matches!(cli.command, Command::Distance { .. }));
    }

    #[test]
    fn test_parse_vin_decode() {
        let cli = Cli::try_parse_from(["courier", "vin", "decode", "JTDBU4EE9B9123456", "--offline"]).unwrap();
        match cli.command {
            Command::Vin(VinCommand::Decode { vin, offline }) => {
                assert_eq!(vin, "JTDBU4EE9B9123456");
                assert!(offline);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_point() {
        assert!(Cli::try_parse_from(["courier", "distance", "north", "25.1,51.2"]).is_err());
    }
}
