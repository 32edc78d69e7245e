//! Groundwater / terrain mesh converter.
//!
//! Turns elevation rasters into textured VTK surfaces, resamples rasters and
//! converts MODPATH pathlines to VTK polydata. Logs go to stderr; the JSON
//! report of each run goes to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mesh_export::{
    convert, export_pathline_timesteps, export_pathlines, load_pathlines, ConversionOptions, PathlineExportOptions,
    PathlineOutputs, TexturePolicy, VtkEncoding,
};
use raster_io::{read_raster, resample, write_raster, InterpolationMethod};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "gw-convert")]
#[command(about = "Convert groundwater and terrain data to VTK meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Elevation raster (+ optional image) to a warped, textured VTK surface
    Dem {
        /// Single-band elevation raster (.asc, .tif, .png + world file)
        #[arg(short, long)]
        elevation: PathBuf,

        /// Image raster co-registered with the elevation raster
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Height scale factor (0 gives a flat mesh, negative inverts relief)
        #[arg(short, long, default_value_t = 1.0, allow_hyphen_values = true)]
        scale: f64,

        /// Nodata value overriding the one declared in the elevation file
        #[arg(long, allow_hyphen_values = true)]
        nodata: Option<f64>,

        /// 1-based elevation band for multi-band rasters
        #[arg(long)]
        elevation_band: Option<usize>,

        /// 1-based image bands for the texture (e.g. 3,2,1)
        #[arg(long, value_delimiter = ',')]
        image_bands: Option<Vec<usize>>,

        /// CRS label written into the mesh header
        #[arg(long)]
        crs: Option<String>,

        /// Name of the elevation point attribute
        #[arg(long, default_value = "Elevation")]
        scalar_name: String,

        /// Vertices outside the image: clamp, extrapolate or reject
        #[arg(long, default_value = "clamp")]
        texture_policy: TexturePolicy,

        /// VTK encoding: binary or ascii
        #[arg(long, default_value = "binary")]
        encoding: VtkEncoding,

        /// Mesh output path
        #[arg(short, long, default_value = "output.vtk")]
        output: PathBuf,

        /// Texture output path
        #[arg(long, default_value = "satellite.png")]
        texture_output: PathBuf,
    },

    /// Resample a raster by a resolution factor
    Resample {
        /// Input raster
        #[arg(short, long)]
        input: PathBuf,

        /// Output raster (.asc, .tif or .png)
        #[arg(short, long)]
        output: PathBuf,

        /// Resolution factor (2 doubles the pixel count per axis)
        #[arg(short, long)]
        scale: f64,

        /// Interpolation: nearest, bilinear or cubic
        #[arg(short, long, default_value = "bilinear")]
        method: InterpolationMethod,
    },

    /// MODPATH pathlines to VTK polylines and start/end point clouds
    Pathlines {
        /// MODPATH 6/7 pathline file
        #[arg(short, long)]
        input: PathBuf,

        /// Pathline output path
        #[arg(short, long)]
        output: PathBuf,

        /// Start point cloud output path
        #[arg(long)]
        start: Option<PathBuf>,

        /// End point cloud output path
        #[arg(long)]
        end: Option<PathBuf>,

        /// Keep every n-th pathline
        #[arg(short, long, default_value_t = 1)]
        divider: usize,

        /// Offset added to every point, as x,y,z
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        offset: Option<Vec<f64>>,

        /// VTK encoding: binary or ascii
        #[arg(long, default_value = "binary")]
        encoding: VtkEncoding,
    },

    /// One VTK file per tracking step, for animating pathlines
    PathlineSteps {
        /// MODPATH 6/7 pathline file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (created when missing)
        #[arg(short, long)]
        output_dir: PathBuf,

        /// File name stem; files are <stem>_<step>.vtk
        #[arg(long, default_value = "pathlines")]
        stem: String,

        /// Keep every n-th pathline
        #[arg(short, long, default_value_t = 1)]
        divider: usize,

        /// Offset added to every point, as x,y,z
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        offset: Option<Vec<f64>>,

        /// VTK encoding: binary or ascii
        #[arg(long, default_value = "binary")]
        encoding: VtkEncoding,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs)?;

    let report = match cli.command {
        Commands::Dem {
            elevation,
            image,
            scale,
            nodata,
            elevation_band,
            image_bands,
            crs,
            scalar_name,
            texture_policy,
            encoding,
            output,
            texture_output,
        } => {
            let options = ConversionOptions {
                height_scale: scale,
                nodata,
                elevation_band,
                image_bands,
                crs,
                scalar_name,
                texture_policy,
                encoding,
                mesh_output: output,
                texture_output,
            };
            let report = convert(&elevation, image.as_deref(), &options)
                .with_context(|| format!("converting {}", elevation.display()))?;
            serde_json::to_value(report)?
        }

        Commands::Resample {
            input,
            output,
            scale,
            method,
        } => {
            let raster = read_raster(&input)?;
            let resampled = resample(&raster, scale, method)?;
            let files = write_raster(&resampled, &output)?;
            serde_json::json!({
                "files": files,
                "width": resampled.width,
                "height": resampled.height,
                "bands": resampled.band_count,
                "method": method.to_string(),
            })
        }

        Commands::Pathlines {
            input,
            output,
            start,
            end,
            divider,
            offset,
            encoding,
        } => {
            let file = load_pathlines(&input)?;
            let options = PathlineExportOptions {
                divider,
                offset: parse_offset(offset)?,
                encoding,
            };
            let outputs = PathlineOutputs {
                lines: output,
                start_points: start,
                end_points: end,
            };
            serde_json::to_value(export_pathlines(&file, &outputs, &options)?)?
        }

        Commands::PathlineSteps {
            input,
            output_dir,
            stem,
            divider,
            offset,
            encoding,
        } => {
            let file = load_pathlines(&input)?;
            let options = PathlineExportOptions {
                divider,
                offset: parse_offset(offset)?,
                encoding,
            };
            let files = export_pathline_timesteps(&file, &output_dir, &stem, &options)?;
            serde_json::json!({ "files": files, "steps": files.len() })
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    info!("Done");
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn parse_offset(values: Option<Vec<f64>>) -> Result<[f64; 3]> {
    match values.as_deref() {
        None => Ok([0.0; 3]),
        Some(&[x, y, z]) => Ok([x, y, z]),
        Some(other) => anyhow::bail!("--offset takes x,y,z, got {} value(s)", other.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dem_arguments() {
        let cli = Cli::try_parse_from([
            "gw-convert",
            "dem",
            "-e",
            "dem.tif",
            "--scale",
            "-2.5",
            "--image-bands",
            "3,2,1",
            "--texture-policy",
            "reject",
        ])
        .unwrap();

        let Commands::Dem {
            scale,
            image_bands,
            texture_policy,
            output,
            ..
        } = cli.command
        else {
            panic!("expected dem command");
        };
        assert_eq!(scale, -2.5);
        assert_eq!(image_bands, Some(vec![3, 2, 1]));
        assert_eq!(texture_policy, TexturePolicy::Reject);
        assert_eq!(output, PathBuf::from("output.vtk"));
    }

    #[test]
    fn test_pathline_offset() {
        let cli = Cli::try_parse_from([
            "gw-convert",
            "pathlines",
            "-i",
            "model.mppth",
            "-o",
            "lines.vtk",
            "--offset",
            "100,-50,0",
        ])
        .unwrap();

        let Commands::Pathlines { offset, .. } = cli.command else {
            panic!("expected pathlines command");
        };
        assert_eq!(parse_offset(offset).unwrap(), [100.0, -50.0, 0.0]);
        assert!(parse_offset(Some(vec![1.0, 2.0])).is_err());
    }
}
