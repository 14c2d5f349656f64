//! Thermoplastic pipe and fitting loader.
//!
//! HDPE walls follow the ISO 4427 table. PVC-U walls are derived from the
//! ISO 1452 SDR series as `ceil(OD / SDR)` to the next 0.1 mm. Derived
//! columns (ID, mass per metre, rating) are computed once here with the
//! default material densities.

use super::Loader;
use crate::config::ThermoplasticConfig;
use crate::errors::EngineResult;
use crate::reference::entities::{sdr_key, FittingType, ThermoplasticMaterial, ThermoplasticSpecification};
use crate::reference::tables::ReferenceTables;
use crate::thermoplastic::{inner_diameter, pipe_weight_per_meter, pressure_rating, pvc_pn_for_sdr, PolyethyleneGrade};

/// ISO 4427 PE100 wall thickness: `(sdr, [(od, wall)])`.
const HDPE_WALLS: [(f64, &[(u32, f64)]); 4] = [
    (
        11.0,
        &[
            (20, 2.0),
            (25, 2.3),
            (32, 3.0),
            (40, 3.7),
            (50, 4.6),
            (63, 5.8),
            (75, 6.8),
            (90, 8.2),
            (110, 10.0),
            (125, 11.4),
            (140, 12.7),
            (160, 14.6),
            (180, 16.4),
            (200, 18.2),
            (225, 20.5),
            (250, 22.7),
            (280, 25.4),
            (315, 28.6),
            (355, 32.2),
            (400, 36.3),
            (450, 40.9),
            (500, 45.4),
            (560, 50.8),
            (630, 57.2),
        ],
    ),
    (
        17.0,
        &[
            (40, 2.4),
            (50, 3.0),
            (63, 3.8),
            (75, 4.5),
            (90, 5.4),
            (110, 6.6),
            (125, 7.4),
            (140, 8.3),
            (160, 9.5),
            (180, 10.7),
            (200, 11.9),
            (225, 13.4),
            (250, 14.8),
            (280, 16.6),
            (315, 18.7),
            (355, 21.1),
            (400, 23.7),
            (450, 26.7),
            (500, 29.7),
            (560, 33.2),
            (630, 37.4),
        ],
    ),
    (
        21.0,
        &[(110, 5.3), (160, 7.7), (200, 9.6), (250, 11.9), (315, 15.0), (400, 19.1), (500, 23.9), (630, 30.0)],
    ),
    (
        26.0,
        &[(110, 4.2), (160, 6.2), (250, 9.6), (315, 12.1), (400, 15.3), (500, 19.1), (630, 24.1)],
    ),
];

const PVC_OUTSIDE_DIAMETERS: [u32; 9] = [50, 63, 75, 90, 110, 160, 200, 250, 315];

const PVC_SDRS: [f64; 7] = [41.0, 33.0, 26.0, 21.0, 17.0, 13.6, 11.0];

/// `(material, code, name, welds, joints, molded, category, [(nb, kg)])`.
type FittingSeed = (
    ThermoplasticMaterial,
    &'static str,
    &'static str,
    u32,
    u32,
    bool,
    &'static str,
    &'static [(u32, f64)],
);

const FITTINGS: [FittingSeed; 12] = [
    (
        ThermoplasticMaterial::Hdpe,
        "molded_90_elbow",
        "Molded 90° Elbow",
        0,
        0,
        true,
        "elbow",
        &[(63, 0.35), (90, 0.9), (110, 1.6), (160, 4.2), (200, 7.8), (250, 14.5), (315, 27.0)],
    ),
    (
        ThermoplasticMaterial::Hdpe,
        "molded_45_elbow",
        "Molded 45° Elbow",
        0,
        0,
        true,
        "elbow",
        &[(63, 0.25), (90, 0.65), (110, 1.1), (160, 2.9), (200, 5.4), (250, 10.0), (315, 18.6)],
    ),
    (
        ThermoplasticMaterial::Hdpe,
        "molded_tee",
        "Molded Equal Tee",
        0,
        0,
        true,
        "tee",
        &[(63, 0.45), (90, 1.2), (110, 2.1), (160, 5.6), (200, 10.5), (250, 19.5), (315, 36.0)],
    ),
    (
        ThermoplasticMaterial::Hdpe,
        "stub_end",
        "Stub End",
        0,
        0,
        true,
        "stub_end",
        &[(63, 0.2), (90, 0.45), (110, 0.7), (160, 1.6), (200, 2.8), (250, 4.9), (315, 8.6)],
    ),
    (
        ThermoplasticMaterial::Hdpe,
        "segmented_90_elbow_3",
        "Segmented 90° Elbow (3 segment)",
        2,
        0,
        false,
        "elbow",
        &[(110, 2.4), (160, 6.4), (200, 11.8), (250, 22.0), (315, 41.0), (400, 80.0), (500, 150.0)],
    ),
    (
        ThermoplasticMaterial::Hdpe,
        "segmented_90_elbow_5",
        "Segmented 90° Elbow (5 segment)",
        4,
        0,
        false,
        "elbow",
        &[(110, 3.0), (160, 7.9), (200, 14.6), (250, 27.5), (315, 51.0), (400, 99.0), (500, 188.0)],
    ),
    (
        ThermoplasticMaterial::PvcU,
        "pvc_elbow_90",
        "PVC-U 90° Elbow",
        0,
        2,
        true,
        "elbow",
        &[(50, 0.12), (63, 0.2), (75, 0.3), (90, 0.48), (110, 0.8), (160, 2.1), (200, 3.9)],
    ),
    (
        ThermoplasticMaterial::PvcU,
        "pvc_elbow_45",
        "PVC-U 45° Elbow",
        0,
        2,
        true,
        "elbow",
        &[(50, 0.09), (63, 0.15), (75, 0.22), (90, 0.35), (110, 0.6), (160, 1.6), (200, 2.9)],
    ),
    (
        ThermoplasticMaterial::PvcU,
        "pvc_tee",
        "PVC-U Equal Tee",
        0,
        3,
        true,
        "tee",
        &[(50, 0.16), (63, 0.27), (75, 0.41), (90, 0.65), (110, 1.1), (160, 2.9), (200, 5.3)],
    ),
    (
        ThermoplasticMaterial::PvcU,
        "pvc_coupler",
        "PVC-U Coupler",
        0,
        2,
        true,
        "coupler",
        &[(50, 0.07), (63, 0.11), (75, 0.17), (90, 0.26), (110, 0.42), (160, 1.1), (200, 2.0)],
    ),
    (
        ThermoplasticMaterial::PvcU,
        "pvc_reducer",
        "PVC-U Reducer",
        0,
        2,
        true,
        "reducer",
        &[(63, 0.09), (75, 0.13), (90, 0.2), (110, 0.33), (160, 0.85), (200, 1.6)],
    ),
    (
        ThermoplasticMaterial::PvcU,
        "pvc_end_cap",
        "PVC-U End Cap",
        0,
        1,
        true,
        "end_cap",
        &[(50, 0.04), (63, 0.07), (75, 0.1), (90, 0.16), (110, 0.27), (160, 0.7), (200, 1.3)],
    ),
];

/// `ceil(od / sdr)` to 0.1 mm.
fn pvc_wall(od: f64, sdr: f64) -> f64 {
    (od / sdr * 10.0).ceil() / 10.0
}

fn specification(
    material: ThermoplasticMaterial,
    od: u32,
    sdr: f64,
    wall: f64,
    density: f64,
    pressure_rating_bar: f64,
    material_grade: &str,
) -> ThermoplasticSpecification {
    let outer = od as f64;
    let inner = inner_diameter(outer, wall);
    ThermoplasticSpecification {
        material,
        nominal_bore_mm: od,
        sdr,
        outer_diameter_mm: outer,
        wall_thickness_mm: wall,
        inner_diameter_mm: inner,
        weight_per_meter_kg: pipe_weight_per_meter(outer, inner, density),
        pressure_rating_bar,
        material_grade: material_grade.to_string(),
    }
}

pub struct Thermoplastics;

impl Loader for Thermoplastics {
    fn version(&self) -> u64 {
        600
    }

    fn name(&self) -> &'static str {
        "thermoplastics"
    }

    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        let defaults = ThermoplasticConfig::default();
        let grade = PolyethyleneGrade::Pe100;

        for (sdr, rows) in HDPE_WALLS {
            let rating = pressure_rating(sdr, grade, defaults.design_coefficient);
            for &(od, wall) in rows {
                tables.upsert_thermoplastic(specification(
                    ThermoplasticMaterial::Hdpe,
                    od,
                    sdr,
                    wall,
                    defaults.hdpe_density_kg_m3,
                    rating,
                    grade.code(),
                ));
            }
        }

        for sdr in PVC_SDRS {
            let rating = pvc_pn_for_sdr(sdr).unwrap_or_default();
            for od in PVC_OUTSIDE_DIAMETERS {
                tables.upsert_thermoplastic(specification(
                    ThermoplasticMaterial::PvcU,
                    od,
                    sdr,
                    pvc_wall(od as f64, sdr),
                    defaults.pvc_density_kg_m3,
                    rating,
                    "PVC-U",
                ));
            }
        }

        for (material, code, name, num_welds, num_joints, is_molded, category, weights) in FITTINGS {
            let fitting_id = tables.upsert_fitting_type(FittingType {
                id: 0,
                material,
                code: code.to_string(),
                name: name.to_string(),
                num_welds,
                num_joints,
                is_molded,
                is_fabricated: !is_molded,
                category: category.to_string(),
            });
            for &(nb, weight) in weights {
                tables.upsert_fitting_weight(fitting_id, nb, weight);
            }
        }
        Ok(())
    }

    fn down(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        let fitting_ids: Vec<_> = tables
            .fitting_types
            .iter()
            .filter(|f| FITTINGS.iter().any(|seed| seed.0 == f.material && seed.1 == f.code))
            .map(|f| f.id)
            .collect();
        tables.fitting_weights.retain(|w| !fitting_ids.contains(&w.fitting_type_id));
        tables.fitting_types.retain(|f| !fitting_ids.contains(&f.id));
        tables.thermoplastic_specs.retain(|s| {
            let key = sdr_key(s.sdr);
            let hdpe = s.material == ThermoplasticMaterial::Hdpe
                && HDPE_WALLS
                    .iter()
                    .any(|(sdr, rows)| sdr_key(*sdr) == key && rows.iter().any(|r| r.0 == s.nominal_bore_mm));
            let pvc = s.material == ThermoplasticMaterial::PvcU
                && PVC_SDRS.iter().any(|sdr| sdr_key(*sdr) == key)
                && PVC_OUTSIDE_DIAMETERS.contains(&s.nominal_bore_mm);
            !(hdpe || pvc)
        });
        Ok(())
    }
}
