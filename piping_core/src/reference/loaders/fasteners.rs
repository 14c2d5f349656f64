//! Fastener loader.
//!
//! Bolts with per-length masses, nuts, ISO 7089 washers, bolting-material
//! specifications by P-T material group, the BNW table (bolt size and
//! bolt-nut-washer mass per hole), bolt-hole counts and blank flange masses.
//! The last three are keyed by the banded pressure class produced by
//! [`normalize_pressure_class`](crate::reference::keys::normalize_pressure_class).

use super::Loader;
use crate::errors::{EngineError, EngineResult};
use crate::reference::entities::{
    BlankFlangeWeight, BnwSet, Bolt, BoltHoleCount, BoltingMaterialGroup, NutMass, Washer,
};
use crate::reference::tables::ReferenceTables;
use crate::units::round_to;

const STEEL_DENSITY_KG_MM3: f64 = 7.85e-6;

/// `(designation, nominal diameter mm, head mass kg, shortest length, longest length)`.
const BOLTS: [(&str, f64, f64, u32, u32); 10] = [
    ("M12", 12.0, 0.017, 40, 120),
    ("M16", 16.0, 0.036, 50, 160),
    ("M20", 20.0, 0.067, 60, 200),
    ("M24", 24.0, 0.111, 70, 240),
    ("M27", 27.0, 0.160, 80, 260),
    ("M30", 30.0, 0.221, 90, 280),
    ("M33", 33.0, 0.290, 100, 300),
    ("M36", 36.0, 0.370, 110, 300),
    ("M39", 39.0, 0.470, 120, 320),
    ("M45", 45.0, 0.720, 140, 360),
];

const BOLT_LENGTH_STEP_MM: usize = 5;

/// Grade 8 hex nuts: `(bolt designation, mass kg)`.
const NUTS: [(&str, f64); 10] = [
    ("M12", 0.017),
    ("M16", 0.034),
    ("M20", 0.064),
    ("M24", 0.110),
    ("M27", 0.165),
    ("M30", 0.225),
    ("M33", 0.295),
    ("M36", 0.390),
    ("M39", 0.480),
    ("M45", 0.750),
];

/// ISO 7089 flat washers: `(designation, ID, OD, thickness, mass kg)`.
const WASHERS: [(&str, f64, f64, f64, f64); 10] = [
    ("M12", 13.0, 24.0, 2.5, 0.0066),
    ("M16", 17.0, 30.0, 3.0, 0.0113),
    ("M20", 21.0, 37.0, 3.0, 0.0172),
    ("M24", 25.0, 44.0, 4.0, 0.0323),
    ("M27", 28.0, 50.0, 4.0, 0.0420),
    ("M30", 31.0, 56.0, 4.0, 0.0530),
    ("M33", 34.0, 60.0, 5.0, 0.0750),
    ("M36", 37.0, 66.0, 5.0, 0.0920),
    ("M39", 42.0, 72.0, 6.0, 0.1300),
    ("M45", 48.0, 85.0, 8.0, 0.2300),
];

/// `(material group, stud, machine bolt, nut, washer)`.
const BOLTING_MATERIALS: [(&str, &str, &str, &str, &str); 6] = [
    (
        "Carbon Steel A105 (Group 1.1)",
        "ASTM A193 B7",
        "ASTM A307 Gr. B",
        "ASTM A194 2H",
        "ASTM F436",
    ),
    (
        "Low Temp Carbon Steel LF2 (Group 1.1)",
        "ASTM A320 L7",
        "ASTM A307 Gr. B",
        "ASTM A194 Gr. 7",
        "ASTM F436",
    ),
    (
        "Low Alloy Steel F22 (Group 1.10)",
        "ASTM A193 B16",
        "ASTM A193 B16",
        "ASTM A194 4",
        "ASTM F436",
    ),
    (
        "Stainless Steel 304 (Group 2.1)",
        "ASTM A193 B8 Cl.2",
        "ASTM A193 B8",
        "ASTM A194 8",
        "ASTM A240 304",
    ),
    (
        "Stainless Steel 316 (Group 2.2)",
        "ASTM A193 B8M Cl.2",
        "ASTM A193 B8M",
        "ASTM A194 8M",
        "ASTM A240 316",
    ),
    (
        "Duplex SS A182 F51 (Group 3.1)",
        "ASTM A276 S31803",
        "ASTM A276 S31803",
        "ASTM A194 Gr. 8M",
        "ASTM A240 S31803",
    ),
];

/// Holes per flange used when the hole table has no entry.
const DEFAULT_HOLES: u32 = 8;

/// `(class key, [(nb, bolt size, kg per hole)])`.
const BNW_PER_HOLE: &[(&str, &[(u32, &str, f64)])] = &[
    (
        "PN6",
        &[
            (15, "M12x50", 0.056),
            (20, "M12x50", 0.056),
            (25, "M12x50", 0.056),
            (32, "M16x55", 0.113),
            (40, "M16x55", 0.113),
            (50, "M16x60", 0.123),
            (65, "M16x60", 0.123),
            (80, "M16x65", 0.131),
            (100, "M16x65", 0.131),
            (125, "M16x70", 0.138),
            (150, "M20x80", 0.256),
            (200, "M20x85", 0.268),
            (250, "M24x95", 0.436),
            (300, "M24x110", 0.487),
            (350, "M24x110", 0.487),
            (400, "M24x120", 0.522),
            (450, "M24x130", 0.554),
            (500, "M30x140", 0.984),
            (600, "M30x160", 1.092),
            (700, "M30x170", 1.146),
            (800, "M36x200", 1.961),
            (900, "M36x210", 2.027),
            (1000, "M36x220", 2.105),
            (1200, "M42x250", 2.55),
        ],
    ),
    (
        "PN10",
        &[
            (15, "M12x50", 0.056),
            (20, "M12x50", 0.056),
            (25, "M12x50", 0.056),
            (32, "M16x55", 0.113),
            (40, "M16x55", 0.113),
            (50, "M16x55", 0.113),
            (65, "M16x60", 0.123),
            (80, "M16x60", 0.123),
            (100, "M16x60", 0.123),
            (125, "M16x65", 0.131),
            (150, "M20x75", 0.244),
            (200, "M20x80", 0.256),
            (250, "M20x80", 0.256),
            (300, "M20x85", 0.268),
            (350, "M20x90", 0.28),
            (400, "M24x95", 0.436),
            (450, "M24x110", 0.487),
            (500, "M24x110", 0.487),
            (600, "M24x130", 0.554),
            (700, "M24x140", 0.588),
            (800, "M30x160", 1.092),
            (900, "M30x170", 1.146),
            (1000, "M30x180", 1.201),
            (1200, "M36x210", 2.027),
        ],
    ),
    (
        "PN16",
        &[
            (15, "M12x60", 0.067),
            (20, "M12x65", 0.071),
            (25, "M12x65", 0.071),
            (32, "M16x70", 0.138),
            (40, "M16x70", 0.138),
            (50, "M16x75", 0.146),
            (65, "M16x75", 0.146),
            (80, "M16x75", 0.146),
            (100, "M16x75", 0.146),
            (125, "M16x80", 0.153),
            (150, "M20x85", 0.268),
            (200, "M20x90", 0.28),
            (250, "M24x100", 0.453),
            (300, "M24x110", 0.487),
            (350, "M24x110", 0.487),
            (400, "M27x130", 0.73),
            (450, "M27x130", 0.73),
            (600, "M33x170", 1.416),
            (700, "M33x180", 1.482),
            (800, "M36x200", 1.961),
            (900, "M36x210", 2.027),
            (1000, "M39x230", 2.624),
            (1200, "M45x270", 4.095),
        ],
    ),
    (
        "PN25",
        &[
            (15, "M12x60", 0.067),
            (20, "M12x60", 0.067),
            (25, "M12x65", 0.071),
            (32, "M16x75", 0.146),
            (40, "M16x75", 0.146),
            (50, "M16x75", 0.146),
            (65, "M16x80", 0.153),
            (80, "M16x80", 0.153),
            (100, "M20x90", 0.28),
            (125, "M24x110", 0.487),
            (150, "M24x110", 0.487),
            (200, "M24x110", 0.487),
            (250, "M24x110", 0.487),
            (300, "M24x110", 0.487),
            (350, "M30x130", 0.929),
            (400, "M30x140", 0.984),
            (450, "M30x150", 1.038),
            (500, "M30x160", 1.092),
            (600, "M36x190", 1.882),
        ],
    ),
    (
        "PN40",
        &[
            (15, "M12x60", 0.067),
            (20, "M12x60", 0.067),
            (25, "M12x65", 0.071),
            (32, "M16x75", 0.146),
            (40, "M16x75", 0.146),
            (50, "M16x75", 0.146),
            (65, "M16x80", 0.153),
            (80, "M16x80", 0.153),
            (100, "M20x90", 0.28),
            (125, "M24x110", 0.487),
            (150, "M24x110", 0.487),
            (200, "M24x110", 0.487),
            (250, "M30x140", 0.984),
            (300, "M30x140", 0.984),
            (350, "M30x150", 1.038),
            (400, "M36x170", 1.725),
            (450, "M36x190", 1.882),
            (500, "M36x210", 2.027),
        ],
    ),
    (
        "PN64",
        &[
            (15, "M16x65", 0.18),
            (20, "M16x70", 0.2),
            (25, "M16x75", 0.22),
            (32, "M20x80", 0.35),
            (40, "M20x85", 0.38),
            (50, "M20x90", 0.4),
            (65, "M24x95", 0.55),
            (80, "M24x100", 0.58),
            (100, "M27x110", 0.8),
            (125, "M30x120", 1.08),
            (150, "M33x130", 1.4),
            (200, "M36x150", 1.9),
            (250, "M39x170", 2.5),
            (300, "M42x190", 3.2),
            (350, "M45x210", 3.9),
            (400, "M48x230", 4.7),
            (450, "M52x250", 5.75),
            (500, "M56x275", 7.0),
            (600, "M60x305", 8.6),
            (700, "M64x340", 10.5),
            (800, "M72x385", 14.0),
            (900, "M76x425", 16.5),
            (1000, "M80x470", 19.5),
            (1200, "M90x560", 27.0),
        ],
    ),
    (
        "Class 150",
        &[
            (15, "1/2\"x55", 0.061),
            (20, "1/2\"x60", 0.067),
            (25, "1/2\"x60", 0.067),
            (32, "1/2\"x65", 0.071),
            (40, "1/2\"x65", 0.071),
            (50, "5/8\"x75", 0.146),
            (65, "5/8\"x80", 0.153),
            (80, "5/8\"x85", 0.161),
            (100, "5/8\"x85", 0.161),
            (125, "3/4\"x90", 0.28),
            (150, "3/4\"x95", 0.292),
            (200, "3/4\"x100", 0.304),
            (250, "7/8\"x110", 0.399),
            (300, "7/8\"x110", 0.399),
            (350, "1\"x120", 0.522),
            (400, "1\"x120", 0.522),
            (450, "1 1/8\"x130", 0.73),
            (500, "1 1/8\"x140", 0.774),
            (600, "1 1/4\"x160", 1.092),
            (700, "1 1/4\"x200", 1.309),
            (800, "1 1/2\"x230", 2.184),
            (900, "1 1/2\"x250", 2.34),
            (1000, "1 1/2\"x250", 2.34),
            (1200, "1 1/2\"x270", 2.497),
        ],
    ),
    (
        "Class 300",
        &[
            (15, "1/2\"x60", 0.067),
            (20, "5/8\"x70", 0.138),
            (25, "5/8\"x70", 0.138),
            (32, "5/8\"x75", 0.146),
            (40, "3/4\"x85", 0.268),
            (50, "5/8\"x80", 0.153),
            (65, "3/4\"x95", 0.292),
            (80, "3/4\"x100", 0.304),
            (100, "3/4\"x110", 0.328),
            (125, "3/4\"x110", 0.328),
            (150, "3/4\"x120", 0.352),
            (200, "7/8\"x130", 0.455),
            (250, "1\"x150", 0.623),
            (300, "1 1/8\"x160", 0.862),
            (350, "1 1/8\"x160", 0.862),
            (400, "1 1/4\"x170", 1.146),
            (450, "1 1/4\"x180", 1.201),
            (500, "1 1/4\"x190", 1.255),
            (600, "1 1/2\"x210", 2.027),
            (700, "1 5/8\"x250", 2.809),
            (800, "1 7/8\"x280", 4.218),
            (900, "2\"x300", 5.149),
            (1000, "1 5/8\"x300", 3.27),
            (1200, "1 3/4\"x330", 2.55),
        ],
    ),
    (
        "Class 600",
        &[
            (15, "1/2\"x75", 0.079),
            (20, "5/8\"x80", 0.153),
            (25, "5/8\"x85", 0.161),
            (32, "5/8\"x90", 0.169),
            (40, "3/4\"x100", 0.304),
            (50, "5/8\"x100", 0.184),
            (65, "3/4\"x110", 0.328),
            (80, "3/4\"x120", 0.352),
            (100, "7/8\"x130", 0.455),
            (125, "1\"x150", 0.623),
            (150, "1\"x160", 0.657),
            (200, "1 1/8\"x180", 0.95),
            (250, "1 1/4\"x200", 1.309),
            (300, "1 1/4\"x210", 1.355),
            (400, "1 1/2\"x230", 2.184),
            (450, "1 5/8\"x250", 2.809),
            (500, "1 5/8\"x270", 2.993),
            (600, "1 7/8\"x300", 4.464),
            (700, "2\"x330", 5.569),
        ],
    ),
];

/// `(class key, [(nb, holes)])`.
const BOLT_HOLES: &[(&str, &[(u32, u32)])] = &[
    ("PN6", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 4), (65, 4), (80, 8), (100, 8), (125, 8), (150, 8), (200, 12), (250, 12), (300, 12), (350, 16), (400, 16), (450, 20), (500, 20), (600, 20), (700, 24), (800, 24), (900, 28), (1000, 28), (1200, 32)]),
    ("PN10", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 4), (65, 4), (80, 8), (100, 8), (125, 8), (150, 8), (200, 8), (250, 12), (300, 12), (350, 16), (400, 16), (450, 20), (500, 20), (600, 20), (700, 24), (800, 24), (900, 28), (1000, 28), (1200, 32)]),
    ("PN16", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 4), (65, 4), (80, 8), (100, 8), (125, 8), (150, 8), (200, 12), (250, 12), (300, 12), (350, 16), (400, 16), (450, 20), (500, 20), (600, 20), (700, 24), (800, 24), (900, 28), (1000, 28), (1200, 32)]),
    ("PN25", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 4), (65, 8), (80, 8), (100, 8), (125, 8), (150, 8), (200, 12), (250, 12), (300, 16), (350, 16), (400, 16), (450, 20), (500, 20), (600, 20)]),
    ("PN40", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 4), (65, 8), (80, 8), (100, 8), (125, 8), (150, 8), (200, 12), (250, 12), (300, 16), (350, 16), (400, 16), (450, 20), (500, 20)]),
    ("PN64", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 8), (65, 8), (80, 8), (100, 8), (125, 8), (150, 12), (200, 12), (250, 16), (300, 20), (350, 20), (400, 20), (450, 24), (500, 24), (600, 24), (700, 28), (800, 32), (900, 36), (1000, 36), (1200, 44)]),
    ("Class 150", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 4), (65, 4), (80, 4), (100, 8), (125, 8), (150, 8), (200, 8), (250, 12), (300, 12), (350, 12), (400, 16), (450, 16), (500, 20), (600, 20), (700, 28), (800, 28), (900, 32), (1000, 36), (1200, 40)]),
    ("Class 300", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 8), (65, 8), (80, 8), (100, 8), (125, 8), (150, 12), (200, 12), (250, 16), (300, 16), (350, 20), (400, 20), (450, 24), (500, 24), (600, 24), (700, 28), (800, 28), (900, 32), (1000, 32), (1200, 32)]),
    ("Class 600", &[(15, 4), (20, 4), (25, 4), (32, 4), (40, 4), (50, 8), (65, 8), (80, 8), (100, 8), (125, 8), (150, 12), (200, 16), (250, 16), (300, 20), (350, 20), (400, 20), (450, 20), (500, 24), (600, 24), (700, 28)]),
];

/// `(class key, [(nb, kg)])`.
const BLANK_WEIGHTS: &[(&str, &[(u32, f64)])] = &[
    ("PN10", &[(50, 2.5), (65, 3.5), (80, 4.5), (100, 6.0), (125, 8.5), (150, 11.0), (200, 16.5), (250, 25.0), (300, 36.0), (350, 46.0), (400, 58.0), (450, 72.0), (500, 90.0), (600, 120.0), (700, 155.0), (750, 175.0), (800, 200.0), (900, 250.0)]),
    ("PN16", &[(50, 3.0), (65, 4.2), (80, 5.4), (100, 7.2), (125, 10.2), (150, 13.2), (200, 19.8), (250, 30.0), (300, 43.2), (350, 55.2), (400, 69.6), (450, 86.4), (500, 108.0), (600, 144.0), (700, 186.0), (750, 210.0), (800, 240.0), (900, 300.0)]),
    ("PN25", &[(50, 4.0), (65, 5.6), (80, 7.2), (100, 9.6), (125, 13.6), (150, 17.6), (200, 26.4), (250, 40.0), (300, 57.6), (350, 73.6), (400, 92.8), (450, 115.2), (500, 144.0), (600, 192.0), (700, 248.0), (750, 280.0), (800, 320.0), (900, 400.0)]),
    ("PN40", &[(50, 5.5), (65, 7.7), (80, 9.9), (100, 13.2), (125, 18.7), (150, 24.2), (200, 36.3), (250, 55.0), (300, 79.2), (350, 101.2), (400, 127.6), (450, 158.4), (500, 198.0), (600, 264.0), (700, 341.0), (750, 385.0), (800, 440.0), (900, 550.0)]),
];

/// Shank plus head mass of a bolt of the given length.
fn bolt_mass_kg(diameter_mm: f64, head_kg: f64, length_mm: u32) -> f64 {
    let shank = std::f64::consts::PI / 4.0 * diameter_mm * diameter_mm * length_mm as f64 * STEEL_DENSITY_KG_MM3;
    round_to(head_kg + shank, 3)
}

fn holes_for(class: &str, nb: u32) -> u32 {
    BOLT_HOLES
        .iter()
        .find(|(key, _)| *key == class)
        .and_then(|(_, rows)| rows.iter().find(|(n, _)| *n == nb))
        .map(|(_, holes)| *holes)
        .unwrap_or(DEFAULT_HOLES)
}

fn bolt(designation: &str) -> Bolt {
    Bolt {
        id: 0,
        designation: designation.to_string(),
        grade: "8.8".to_string(),
        material: "Carbon Steel".to_string(),
        head_style: "Hex".to_string(),
        thread_type: "Coarse".to_string(),
    }
}

pub struct Fasteners;

impl Fasteners {
    fn seed_bolts(tables: &mut ReferenceTables) {
        for (designation, diameter, head_kg, shortest, longest) in BOLTS {
            let bolt_id = tables.upsert_bolt(bolt(designation));
            for length in (shortest..=longest).step_by(BOLT_LENGTH_STEP_MM) {
                tables.upsert_bolt_mass(bolt_id, length, bolt_mass_kg(diameter, head_kg, length));
            }
        }
    }

    fn seed_nuts_and_washers(tables: &mut ReferenceTables) -> EngineResult<()> {
        for (designation, mass_kg) in NUTS {
            let bolt_id = tables
                .bolt_id(designation)
                .ok_or_else(|| EngineError::reference_not_found("bolts", designation))?;
            tables.upsert_nut_mass(NutMass {
                id: 0,
                bolt_id,
                mass_kg,
                grade: "8".to_string(),
                nut_type: "Hex".to_string(),
            });
        }
        for (designation, inner, outer, thickness, mass_kg) in WASHERS {
            tables.upsert_washer(Washer {
                id: 0,
                designation: designation.to_string(),
                specification: "ISO 7089".to_string(),
                inner_diameter_mm: inner,
                outer_diameter_mm: outer,
                thickness_mm: thickness,
                mass_kg,
                material: "Carbon Steel".to_string(),
            });
        }
        Ok(())
    }

    fn seed_class_tables(tables: &mut ReferenceTables) {
        for (class, rows) in BOLT_HOLES {
            for &(nominal_bore_mm, holes) in rows.iter() {
                tables.upsert_bolt_hole_count(BoltHoleCount {
                    pressure_class_key: class.to_string(),
                    nominal_bore_mm,
                    holes,
                });
            }
        }
        for (class, rows) in BNW_PER_HOLE {
            for &(nominal_bore_mm, bolt_size, weight_per_hole_kg) in rows.iter() {
                tables.upsert_bnw_set(BnwSet {
                    pressure_class_key: class.to_string(),
                    nominal_bore_mm,
                    bolt_size: bolt_size.to_string(),
                    weight_per_hole_kg,
                    holes_per_flange: holes_for(class, nominal_bore_mm),
                });
            }
        }
        for (class, rows) in BLANK_WEIGHTS {
            for &(nominal_bore_mm, mass_kg) in rows.iter() {
                tables.upsert_blank_flange_weight(BlankFlangeWeight {
                    pressure_class_key: class.to_string(),
                    nominal_bore_mm,
                    mass_kg,
                });
            }
        }
    }
}

impl Loader for Fasteners {
    fn version(&self) -> u64 {
        300
    }

    fn name(&self) -> &'static str {
        "fasteners"
    }

    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        Self::seed_bolts(tables);
        Self::seed_nuts_and_washers(tables)?;
        for (group, stud, machine_bolt, nut, washer) in BOLTING_MATERIALS {
            tables.upsert_bolting_material(BoltingMaterialGroup {
                material_group: group.to_string(),
                stud_spec: stud.to_string(),
                machine_bolt_spec: machine_bolt.to_string(),
                nut_spec: nut.to_string(),
                washer_spec: washer.to_string(),
            });
        }
        Self::seed_class_tables(tables);
        Ok(())
    }

    /// Bolt rows stay: flange rows reference them by id.
    fn down(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        let bolt_ids: Vec<_> = BOLTS.iter().filter_map(|b| tables.bolt_id(b.0)).collect();
        tables.bolt_masses.retain(|m| !bolt_ids.contains(&m.bolt_id));
        tables.nut_masses.retain(|n| !bolt_ids.contains(&n.bolt_id));
        tables.washers.retain(|w| w.specification != "ISO 7089");
        tables
            .bolting_materials
            .retain(|g| !BOLTING_MATERIALS.iter().any(|m| m.0 == g.material_group));
        tables.bnw_sets.clear();
        tables.bolt_hole_counts.clear();
        tables.blank_flange_weights.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::loaders::ensure_bolt;

    fn loaded() -> ReferenceTables {
        let mut tables = ReferenceTables::new();
        Fasteners.up(&mut tables).unwrap();
        tables
    }

    #[test]
    fn test_bolt_mass_grows_with_length() {
        assert!(bolt_mass_kg(16.0, 0.036, 80) > bolt_mass_kg(16.0, 0.036, 75));
        // 0.036 + π/4 × 16² × 75 × 7.85e-6
        assert_eq!(bolt_mass_kg(16.0, 0.036, 75), 0.154);
    }

    #[test]
    fn test_bolt_lengths_cover_range() {
        let tables = loaded();
        let m16 = tables.bolt_id("M16").unwrap();
        let lengths: Vec<u32> = tables
            .bolt_masses
            .iter()
            .filter(|m| m.bolt_id == m16)
            .map(|m| m.length_mm)
            .collect();
        assert_eq!(lengths.first(), Some(&50));
        assert_eq!(lengths.last(), Some(&160));
        assert_eq!(lengths.len(), 23);
    }

    #[test]
    fn test_existing_bolt_id_is_kept() {
        let mut tables = ReferenceTables::new();
        let id = ensure_bolt(&mut tables, "M20");
        Fasteners.up(&mut tables).unwrap();
        assert_eq!(tables.bolt_id("M20"), Some(id));
    }

    #[test]
    fn test_bnw_rows_carry_hole_counts() {
        let tables = loaded();
        let set = tables
            .bnw_sets
            .iter()
            .find(|s| s.pressure_class_key == "PN16" && s.nominal_bore_mm == 200)
            .unwrap();
        assert_eq!(set.bolt_size, "M20x90");
        assert_eq!(set.weight_per_hole_kg, 0.28);
        assert_eq!(set.holes_per_flange, 12);
    }

    #[test]
    fn test_pn16_500_has_no_bnw_row() {
        let tables = loaded();
        assert!(!tables
            .bnw_sets
            .iter()
            .any(|s| s.pressure_class_key == "PN16" && s.nominal_bore_mm == 500));
        assert!(tables
            .bolt_hole_counts
            .iter()
            .any(|h| h.pressure_class_key == "PN16" && h.nominal_bore_mm == 500 && h.holes == 20));
    }

    #[test]
    fn test_down_clears_class_tables() {
        let mut tables = loaded();
        Fasteners.down(&mut tables).unwrap();
        assert!(tables.bnw_sets.is_empty());
        assert!(tables.bolt_masses.is_empty());
        assert!(tables.washers.is_empty());
        assert!(!tables.bolts.is_empty());
    }
}
