//! # Piping CLI
//!
//! Command-line front end for the resolution engine. Builds one reference
//! store per run, answers a single lookup, and prints a short human summary
//! followed by the JSON result (or only the JSON with `--json`).
//!
//! ```text
//! piping flange-weight 300 PN16 --standard "BS 4504" --flange-type /2
//! piping --json bnw 200 1600/3
//! piping --snapshot reference.json pt-rating "ASME B16.5" 300 --material "A182 F316" 200
//! ```

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use piping_core::file_io::{load_config, save_snapshot, FileLock, Snapshot};
use piping_core::reference::{try_builtin_store, ReferenceSource, SeededSource, SnapshotSource, ThermoplasticMaterial};
use piping_core::resolvers::{asme_group_number, blank_flange_surface_area, snap_temperature_up};
use piping_core::thermoplastic::validation::SdrAdvice;
use piping_core::thermoplastic::{
    FittingCostInput, JoiningMethod, PipeCostInput, PolyethyleneGrade, ServiceConditions, WeldedPipeCostInput,
};
use piping_core::{Engine, EngineConfig, EngineError, EngineResult};

#[derive(Parser)]
#[command(name = "piping")]
#[command(about = "Piping component resolution engine - flange, fastener, gasket, P-T and thermoplastic lookups", long_about = None)]
struct Cli {
    /// Reference snapshot to load instead of the built-in data
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    /// Engine configuration JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Remote catalog base URL; overrides the config file
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print only the JSON result
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flange mass by NB, pressure class, standard and type
    FlangeWeight {
        nb: u32,
        pressure_class: String,
        #[arg(long)]
        standard: Option<String>,
        #[arg(long, default_value = "/2")]
        flange_type: String,
    },
    /// Blank (blind) flange mass and coating areas
    BlankWeight { nb: u32, pressure_class: String },
    /// Blank flange mass for a SABS 1123 table designation
    SansBlankWeight { nb: u32, table_designation: String },
    /// Bolt-nut-washer set for one flange
    Bnw { nb: u32, pressure_class: String },
    /// Gasket mass by gasket code and NB
    Gasket { gasket_type: String, nb: u32 },
    /// Retaining ring geometry and mass
    Ring {
        nb: u32,
        /// Pipe OD in mm; defaults to the NB→OD table
        #[arg(long)]
        pipe_od: Option<f64>,
    },
    /// P-T material group for a material specification
    MaterialGroup { spec_text: String },
    /// Allowable pressure for a class, material and temperature
    PtRating {
        standard: String,
        designation: String,
        temperature: i32,
        /// Material specification text, mapped to a P-T group
        #[arg(long, conflicts_with = "group")]
        material: Option<String>,
        /// P-T material group, used as given
        #[arg(long)]
        group: Option<String>,
    },
    /// Thermoplastic pipe dimensions, optionally costed for a run
    HdpePipe {
        od: u32,
        sdr: f64,
        #[arg(long, default_value = "HDPE")]
        material: String,
        /// Run length in metres; enables costing
        #[arg(long)]
        length: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        price_per_kg: f64,
        #[arg(long, default_value_t = 0.0)]
        joint_price: f64,
    },
    /// Supply cost of one thermoplastic fitting
    FittingCost {
        fitting_code: String,
        nb: u32,
        #[arg(long, default_value = "HDPE")]
        material: String,
        #[arg(long, default_value_t = 0.0)]
        price_per_kg: f64,
        #[arg(long, default_value_t = 0.0)]
        per_joint_price: f64,
    },
    /// Thinnest standard PE wall meeting a working pressure
    RecommendSdr {
        target_bar: f64,
        #[arg(long, default_value = "PE100")]
        grade: String,
    },
    /// PE service check: SDR against pressure, grade availability, temperature derating
    PeCheck {
        sdr: f64,
        required_bar: f64,
        #[arg(long, default_value = "PE100")]
        grade: String,
        /// Operating temperature in °C
        #[arg(long, default_value_t = 20.0)]
        temperature: f64,
    },
    /// HDPE run costed with fused joints and machine hire
    WeldedPipe {
        od: u32,
        sdr: f64,
        length: f64,
        #[arg(long, default_value_t = 0.0)]
        price_per_kg: f64,
        /// butt_fusion or electrofusion
        #[arg(long, default_value = "butt_fusion")]
        method: String,
    },
    /// Write the loaded reference tables to a snapshot file
    ExportSnapshot {
        output: PathBuf,
        /// Name recorded in the lock file while writing
        #[arg(long, default_value = "piping-cli")]
        user: String,
    },
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> EngineResult<()> {
    if let Commands::ExportSnapshot { output, user } = &cli.command {
        return export_snapshot(cli.snapshot.as_deref(), output, user);
    }

    let engine = build_engine(cli)?;
    let out = Output { json_only: cli.json };

    match &cli.command {
        Commands::FlangeWeight {
            nb,
            pressure_class,
            standard,
            flange_type,
        } => {
            let mass = engine.flange_weight(*nb, pressure_class, standard.as_deref(), flange_type);
            let local = engine.resolve_flange_weight(*nb, pressure_class, standard.as_deref(), flange_type);
            out.emit(
                format!("{} NB {} {} flange: {} kg", nb, pressure_class, flange_type, mass),
                &json!({
                    "nb": nb,
                    "pressure_class": pressure_class,
                    "standard": standard,
                    "flange_type": flange_type,
                    "mass_kg": mass,
                    "local_tier": local.tier,
                }),
            )
        }
        Commands::BlankWeight { nb, pressure_class } => {
            let mass = engine.blank_flange_weight(*nb, pressure_class);
            let area = blank_flange_surface_area(*nb);
            out.emit(
                format!(
                    "{} NB {} blank flange: {} kg, {:.3} m² external, {:.3} m² internal",
                    nb, pressure_class, mass, area.external_m2, area.internal_m2
                ),
                &json!({ "nb": nb, "pressure_class": pressure_class, "mass_kg": mass, "surface_area": area }),
            )
        }
        Commands::SansBlankWeight { nb, table_designation } => {
            let mass = engine.sans_blank_flange_weight(*nb, table_designation);
            out.emit(
                format!("{} NB SABS 1123 {} blank flange: {} kg", nb, table_designation, mass),
                &json!({ "nb": nb, "table_designation": table_designation, "mass_kg": mass }),
            )
        }
        Commands::Bnw { nb, pressure_class } => {
            let set = engine.bnw_set_info(*nb, pressure_class);
            out.emit(
                format!(
                    "{} NB {}: {} x {} at {} kg per hole ({} kg per flange pair)",
                    nb,
                    pressure_class,
                    set.num_holes,
                    set.bolt_size,
                    set.weight_per_hole_kg,
                    set.mass_for_flange_pair()
                ),
                &set,
            )
        }
        Commands::Gasket { gasket_type, nb } => {
            let mass = engine.gasket_weight(gasket_type, *nb);
            out.emit(
                format!("{} NB {} gasket: {} kg", nb, gasket_type, mass),
                &json!({ "gasket_type": gasket_type, "nb": nb, "mass_kg": mass }),
            )
        }
        Commands::Ring { nb, pipe_od } => {
            let ring = engine.retaining_ring(*nb, *pipe_od);
            let mass = engine.retaining_ring_weight(*nb, *pipe_od);
            out.emit(
                format!(
                    "{} NB retaining ring: {:.1} OD x {:.1} ID x {:.1} thick, {} kg",
                    nb, ring.ring_od_mm, ring.ring_id_mm, ring.thickness_mm, mass
                ),
                &json!({ "ring": ring, "mass_kg": mass }),
            )
        }
        Commands::MaterialGroup { spec_text } => {
            let group = engine.pt_rating_material_group(spec_text);
            let asme = asme_group_number(spec_text);
            out.emit(
                format!("{:?} → {} (ASME group {})", spec_text, group, asme),
                &json!({ "spec_text": spec_text, "material_group": group, "asme_group": asme }),
            )
        }
        Commands::PtRating {
            standard,
            designation,
            temperature,
            material,
            group,
        } => {
            let group = match (group, material) {
                (Some(group), _) => group.clone(),
                (None, Some(text)) => engine.pt_rating_material_group(text).to_string(),
                (None, None) => engine.pt_rating_material_group("").to_string(),
            };
            let rating = engine.pt_rating(standard, designation, &group, *temperature);
            let snapped = match rating {
                Some(_) => None,
                None => engine
                    .store()
                    .pressure_class_by_designation(standard, designation)
                    .and_then(|class| snap_temperature_up(engine.store(), class.id, &group, *temperature)),
            };
            let summary = match (rating, snapped) {
                (Some(bar), _) => format!("{} {} {} at {} °C: {} bar", standard, designation, group, temperature, bar),
                (None, Some(t)) => format!(
                    "{} {} {} at {} °C: not catalogued (next catalogued temperature {} °C)",
                    standard, designation, group, temperature, t
                ),
                (None, None) => format!("{} {} {} at {} °C: not catalogued", standard, designation, group, temperature),
            };
            out.emit(
                summary,
                &json!({
                    "standard": standard,
                    "designation": designation,
                    "material_group": group,
                    "temperature_celsius": temperature,
                    "max_pressure_bar": rating,
                    "next_catalogued_temperature": snapped,
                }),
            )
        }
        Commands::HdpePipe {
            od,
            sdr,
            material,
            length,
            price_per_kg,
            joint_price,
        } => {
            let material = parse_material(material)?;
            match length {
                Some(length_m) => {
                    let result = engine.pipe_cost(&PipeCostInput {
                        material,
                        nominal_bore_mm: *od,
                        sdr: *sdr,
                        length_m: *length_m,
                        price_per_kg: *price_per_kg,
                        joint_price: *joint_price,
                    })?;
                    out.emit(
                        format!(
                            "{} OD{} SDR {}: {} m = {} kg, {} lengths, {} joints, total {}",
                            material,
                            od,
                            sdr,
                            length_m,
                            result.total_weight_kg,
                            result.joints.pipe_lengths_needed,
                            result.joints.joint_count,
                            result.total_cost
                        ),
                        &result,
                    )
                }
                None => {
                    let dims = engine.pipe_dimensions(material, *od, *sdr);
                    out.emit(
                        format!(
                            "{} OD{} SDR {}: wall {} mm, bore {} mm, {} kg/m, PN {} bar",
                            material,
                            od,
                            sdr,
                            dims.wall_thickness_mm,
                            dims.inner_diameter_mm,
                            dims.weight_per_meter_kg,
                            dims.pressure_rating_bar
                        ),
                        &dims,
                    )
                }
            }
        }
        Commands::FittingCost {
            fitting_code,
            nb,
            material,
            price_per_kg,
            per_joint_price,
        } => {
            let result = engine.fitting_cost(&FittingCostInput {
                material: parse_material(material)?,
                fitting_code: fitting_code.clone(),
                nominal_bore_mm: *nb,
                price_per_kg: *price_per_kg,
                per_joint_price: *per_joint_price,
            })?;
            let estimated = if result.weight_estimated { " (estimated)" } else { "" };
            out.emit(
                format!(
                    "{} {} NB: {} kg{}, {} joins, total {}",
                    fitting_code, nb, result.weight_kg, estimated, result.joins, result.total_cost
                ),
                &result,
            )
        }
        Commands::RecommendSdr { target_bar, grade } => {
            let grade = parse_grade(grade)?;
            let sdr = engine.recommended_sdr(*target_bar, grade);
            let rating = engine.pressure_rating(sdr, grade);
            out.emit(
                format!("{} for {} bar: SDR {} (rated {} bar)", grade, target_bar, sdr, rating),
                &json!({ "grade": grade, "target_bar": target_bar, "sdr": sdr, "pressure_rating_bar": rating }),
            )
        }
        Commands::PeCheck {
            sdr,
            required_bar,
            grade,
            temperature,
        } => {
            let check = engine.check_service(&ServiceConditions {
                grade: parse_grade(grade)?,
                sdr: *sdr,
                required_bar: *required_bar,
                temperature_c: *temperature,
            });
            let mut summary = format!(
                "{} SDR {} at {} °C: rated {} bar, derated {} bar for {} bar required: {}",
                check.pressure.grade,
                sdr,
                temperature,
                check.pressure.rated_bar,
                check.temperature.derated_rating_bar,
                required_bar,
                if check.passes() { "OK" } else { "NOT OK" }
            );
            for issue in &check.temperature.issues {
                summary.push_str(&format!("\n  error: {}", issue));
            }
            for issue in &check.compatibility.issues {
                summary.push_str(&format!("\n  note: {}", issue));
            }
            for warning in &check.temperature.warnings {
                summary.push_str(&format!("\n  warning: {}", warning));
            }
            match check.pressure.advice {
                SdrAdvice::UseThickerWall { sdr } => summary.push_str(&format!("\n  use SDR {} instead", sdr)),
                SdrAdvice::NoStandardSdr => summary.push_str("\n  no standard SDR meets this pressure"),
                SdrAdvice::ThinnerWallSuffices { sdr } => {
                    summary.push_str(&format!("\n  SDR {} would also do", sdr))
                }
                SdrAdvice::Adequate => {}
            }
            out.emit(summary, &check)
        }
        Commands::WeldedPipe {
            od,
            sdr,
            length,
            price_per_kg,
            method,
        } => {
            let method = JoiningMethod::from_code(method).ok_or_else(|| {
                EngineError::invalid_input("method", method.as_str(), "Expected butt_fusion or electrofusion")
            })?;
            let result = engine.welded_pipe_cost(&WeldedPipeCostInput {
                nominal_bore_mm: *od,
                sdr: *sdr,
                length_m: *length,
                price_per_kg: *price_per_kg,
                method,
            })?;
            out.emit(
                format!(
                    "HDPE OD{} SDR {}: {} m, {} joints at {} each, total {} (machine hire {} over {} days)",
                    od,
                    sdr,
                    length,
                    result.joints.joint_count,
                    result.cost_per_joint.total_per_joint,
                    result.total_cost,
                    result.machine_rental.cost,
                    result.machine_rental.days
                ),
                &result,
            )
        }
        Commands::ExportSnapshot { .. } => Ok(()),
    }
}

fn parse_grade(code: &str) -> EngineResult<PolyethyleneGrade> {
    PolyethyleneGrade::from_code(code)
        .ok_or_else(|| EngineError::invalid_input("grade", code, "Expected PE80 or PE100"))
}

fn build_engine(cli: &Cli) -> EngineResult<Engine> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(url) = &cli.api_url {
        config.remote.base_url = Some(url.clone());
    }

    match &cli.snapshot {
        Some(path) => Engine::from_source(&SnapshotSource::new(path), config),
        None => Engine::from_config(try_builtin_store()?, config),
    }
}

fn export_snapshot(source: Option<&Path>, output: &Path, user: &str) -> EngineResult<()> {
    let tables = match source {
        Some(path) => SnapshotSource::new(path).fetch_tables()?,
        None => SeededSource::new().fetch_tables()?,
    };
    let snapshot = Snapshot::new(tables);

    let _lock = FileLock::acquire(output, user)?;
    save_snapshot(&snapshot, output)?;
    debug!(path = %output.display(), "snapshot written");

    println!(
        "Wrote snapshot {} ({} flange rows) to {}",
        snapshot.meta.snapshot_id,
        snapshot.tables.flange_dimensions.len(),
        output.display()
    );
    Ok(())
}

fn parse_material(code: &str) -> EngineResult<ThermoplasticMaterial> {
    ThermoplasticMaterial::from_code(code)
        .ok_or_else(|| EngineError::invalid_input("material", code, "Expected HDPE or PVC-U"))
}

struct Output {
    json_only: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, summary: String, value: &T) -> EngineResult<()> {
        let json = serde_json::to_string_pretty(value).map_err(EngineError::serialization)?;
        if !self.json_only {
            println!("{}", summary);
            println!();
        }
        println!("{}", json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["piping", "bnw", "200", "PN16", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Bnw { nb: 200, .. }));
    }

    #[test]
    fn test_pt_rating_material_and_group_conflict() {
        let parsed = Cli::try_parse_from([
            "piping", "pt-rating", "ASME B16.5", "150", "38", "--material", "A105", "--group", "x",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_api_url_overrides_config() {
        let cli = Cli::try_parse_from(["piping", "--api-url", "http://catalog.local", "gasket", "SW-", "100"]).unwrap();
        let engine = build_engine(&cli).unwrap();
        assert!(engine.has_remote());
    }

    #[test]
    fn test_parse_material() {
        assert_eq!(parse_material("pe100").unwrap(), ThermoplasticMaterial::Hdpe);
        assert_eq!(parse_material("uPVC").unwrap(), ThermoplasticMaterial::PvcU);
        assert_eq!(parse_material("steel").unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_pe_check_defaults() {
        let cli = Cli::try_parse_from(["piping", "pe-check", "11", "10"]).unwrap();
        match cli.command {
            Commands::PeCheck { sdr, required_bar, grade, temperature } => {
                assert_eq!(sdr, 11.0);
                assert_eq!(required_bar, 10.0);
                assert_eq!(grade, "PE100");
                assert_eq!(temperature, 20.0);
            }
            _ => panic!("expected pe-check"),
        }
        assert_eq!(parse_grade("pe80").unwrap(), PolyethyleneGrade::Pe80);
        assert_eq!(parse_grade("PE63").unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_welded_pipe_method_flag() {
        let cli =
            Cli::try_parse_from(["piping", "welded-pipe", "110", "11", "30", "--method", "electrofusion"]).unwrap();
        assert!(matches!(cli.command, Commands::WeldedPipe { ref method, .. } if method == "electrofusion"));
    }
}
