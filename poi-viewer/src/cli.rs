use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

/// Displays a point cloud scan with clickable points of interest.
#[derive(StructOpt, Debug, Clone)]
#[structopt(name = "poi-viewer")]
pub struct Args {
    /// Verbosity of the command line output.
    #[structopt(long, default_value="info", possible_values = &["trace", "debug", "info", "warn", "error"])]
    pub log_level: log::Level,

    /// How to color the points. With 'auto', per-point colors are used if the
    /// input file has them, and a fixed color otherwise.
    #[structopt(long, default_value = "auto", possible_values = &["auto", "fixed", "rgb", "intensity"])]
    pub point_color: PointColorArg,

    /// Size of the points, in pixels.
    #[structopt(long, default_value = "3")]
    pub point_size: f32,

    /// The multisampling level. Must be a power of two; 0 disables multisampling.
    #[structopt(long, default_value = "2")]
    pub multisampling: u16,

    /// JSON file with the points of interest to show.
    /// Two built-in example points are used if this is not given.
    #[structopt(long)]
    pub pois: Option<PathBuf>,

    /// The point cloud file to display. PLY and LAS/LAZ files are supported.
    #[structopt(default_value = "model.ply")]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PointColorArg {
    Auto,
    Fixed,
    Rgb,
    Intensity,
}

impl FromStr for PointColorArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(PointColorArg::Auto),
            "fixed" => Ok(PointColorArg::Fixed),
            "rgb" => Ok(PointColorArg::Rgb),
            "intensity" => Ok(PointColorArg::Intensity),
            _ => Err(anyhow::Error::msg(
                "Invalid value - must be one of: 'auto', 'fixed', 'rgb', 'intensity'",
            )),
        }
    }
}
