//! Reference Tables
//!
//! The mutable row collection that loaders write into. Every write goes
//! through a natural-key upsert, so re-running a loader never duplicates a
//! row. Once loading is finished the tables are indexed into an immutable
//! [`ReferenceDataStore`](super::store::ReferenceDataStore).

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entities::*;
use crate::errors::{EngineError, EngineResult};

/// Ledger entry for a loader that has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedLoader {
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// All canonical tables plus the applied-loader ledger.
///
/// Upserts locate existing rows through a natural-key position cache that
/// is neither serialized nor compared. The cache is rebuilt whenever its
/// size disagrees with its table; call [`reindex`](Self::reindex) after
/// editing a row vector directly in any other way than removing rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    pub standards: Vec<Standard>,
    pub pressure_classes: Vec<PressureClass>,
    pub flange_types: Vec<FlangeType>,
    pub nominal_outside_diameters: Vec<NominalOutsideDiameter>,
    pub flange_dimensions: Vec<FlangeDimension>,
    pub bolts: Vec<Bolt>,
    pub bolt_masses: Vec<BoltMass>,
    pub nut_masses: Vec<NutMass>,
    pub washers: Vec<Washer>,
    pub bolting_materials: Vec<BoltingMaterialGroup>,
    pub bnw_sets: Vec<BnwSet>,
    pub bolt_hole_counts: Vec<BoltHoleCount>,
    pub blank_flange_weights: Vec<BlankFlangeWeight>,
    pub gasket_weights: Vec<GasketWeight>,
    pub pt_ratings: Vec<PtRating>,
    pub thermoplastic_specs: Vec<ThermoplasticSpecification>,
    pub fitting_types: Vec<FittingType>,
    pub fitting_weights: Vec<FittingWeight>,
    /// Loader version → ledger entry
    pub applied: BTreeMap<u64, AppliedLoader>,
    #[serde(skip)]
    index: RowIndexes,
}

fn next_id<T>(rows: &[T], id: impl Fn(&T) -> RowId) -> RowId {
    rows.iter().map(id).max().unwrap_or(0) + 1
}

// ============================================================================
// Natural-key index
// ============================================================================

/// Natural key → row position for one table.
///
/// A cached position is only trusted after the row it points at is checked
/// against the key. When the map and the table differ in size the map is
/// rebuilt (on the write path) or bypassed by a scan (on the read path).
/// Duplicate keys resolve to the first row, as a scan would.
#[derive(Debug, Clone)]
struct KeyIndex<K> {
    positions: HashMap<K, usize>,
}

impl<K> Default for KeyIndex<K> {
    fn default() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> KeyIndex<K> {
    fn rebuild<T>(&mut self, rows: &[T], key_of: &impl Fn(&T) -> K) {
        self.positions.clear();
        for (position, row) in rows.iter().enumerate() {
            self.positions.entry(key_of(row)).or_insert(position);
        }
    }

    fn find<T>(&self, rows: &[T], key: &K, key_of: impl Fn(&T) -> K) -> Option<usize> {
        if self.positions.len() == rows.len() {
            match self.positions.get(key) {
                Some(&position) if rows.get(position).is_some_and(|row| key_of(row) == *key) => {
                    return Some(position)
                }
                None => return None,
                Some(_) => {}
            }
        }
        rows.iter().position(|row| key_of(row) == *key)
    }

    fn locate<T>(&mut self, rows: &[T], key: &K, key_of: impl Fn(&T) -> K) -> Option<usize> {
        if self.positions.len() != rows.len() {
            self.rebuild(rows, &key_of);
        }
        match self.positions.get(key) {
            Some(&position) if rows.get(position).is_some_and(|row| key_of(row) == *key) => Some(position),
            Some(_) => {
                self.rebuild(rows, &key_of);
                self.positions.get(key).copied()
            }
            None => None,
        }
    }

    fn record(&mut self, key: K, position: usize) {
        self.positions.insert(key, position);
    }
}

type FlangeKey = (RowId, RowId, RowId, Option<RowId>);
type ClassBoreKey = (String, u32);

#[derive(Debug, Clone, Default)]
struct RowIndexes {
    standards: KeyIndex<String>,
    pressure_classes: KeyIndex<(RowId, String)>,
    flange_types: KeyIndex<String>,
    nominal_outside_diameters: KeyIndex<u32>,
    flange_dimensions: KeyIndex<FlangeKey>,
    bolts: KeyIndex<String>,
    bolt_masses: KeyIndex<(RowId, u32)>,
    nut_masses: KeyIndex<(RowId, String, String)>,
    washers: KeyIndex<(String, String)>,
    bolting_materials: KeyIndex<String>,
    bnw_sets: KeyIndex<ClassBoreKey>,
    bolt_hole_counts: KeyIndex<ClassBoreKey>,
    blank_flange_weights: KeyIndex<ClassBoreKey>,
    gasket_weights: KeyIndex<u32>,
    pt_ratings: KeyIndex<(RowId, String, i32)>,
    thermoplastic_specs: KeyIndex<(ThermoplasticMaterial, u32, u32)>,
    fitting_types: KeyIndex<(ThermoplasticMaterial, String)>,
    fitting_weights: KeyIndex<(RowId, u32)>,
}

// The cache never affects table equality.
impl PartialEq for RowIndexes {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

fn standard_key(s: &Standard) -> String {
    s.code.clone()
}

fn pressure_class_key(pc: &PressureClass) -> (RowId, String) {
    (pc.standard_id, pc.designation.clone())
}

fn flange_type_key(t: &FlangeType) -> String {
    t.code.clone()
}

fn nominal_od_key(n: &NominalOutsideDiameter) -> u32 {
    n.nominal_diameter_mm
}

fn flange_key(d: &FlangeDimension) -> FlangeKey {
    (d.nominal_outside_diameter_id, d.standard_id, d.pressure_class_id, d.flange_type_id)
}

fn bolt_key(b: &Bolt) -> String {
    b.designation.clone()
}

fn bolt_mass_key(m: &BoltMass) -> (RowId, u32) {
    (m.bolt_id, m.length_mm)
}

fn nut_mass_key(n: &NutMass) -> (RowId, String, String) {
    (n.bolt_id, n.grade.clone(), n.nut_type.clone())
}

fn washer_key(w: &Washer) -> (String, String) {
    (w.designation.clone(), w.specification.clone())
}

fn bolting_material_key(g: &BoltingMaterialGroup) -> String {
    g.material_group.clone()
}

fn bnw_key(s: &BnwSet) -> ClassBoreKey {
    (s.pressure_class_key.clone(), s.nominal_bore_mm)
}

fn hole_count_key(h: &BoltHoleCount) -> ClassBoreKey {
    (h.pressure_class_key.clone(), h.nominal_bore_mm)
}

fn blank_weight_key(w: &BlankFlangeWeight) -> ClassBoreKey {
    (w.pressure_class_key.clone(), w.nominal_bore_mm)
}

fn gasket_key(g: &GasketWeight) -> u32 {
    g.nominal_bore_mm
}

fn pt_rating_key(r: &PtRating) -> (RowId, String, i32) {
    (r.pressure_class_id, r.material_group.clone(), r.temperature_celsius)
}

fn thermoplastic_key(s: &ThermoplasticSpecification) -> (ThermoplasticMaterial, u32, u32) {
    (s.material, s.nominal_bore_mm, sdr_key(s.sdr))
}

fn fitting_type_key(f: &FittingType) -> (ThermoplasticMaterial, String) {
    (f.material, f.code.clone())
}

fn fitting_weight_key(w: &FittingWeight) -> (RowId, u32) {
    (w.fitting_type_id, w.nominal_bore_mm)
}

impl ReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the natural-key cache; it is rebuilt on the next upsert.
    pub fn reindex(&mut self) {
        self.index = RowIndexes::default();
    }

    // ========================================================================
    // Natural-key lookups used by loaders
    // ========================================================================

    pub fn standard_id(&self, code: &str) -> Option<RowId> {
        self.index
            .standards
            .find(&self.standards, &code.to_string(), standard_key)
            .map(|pos| self.standards[pos].id)
    }

    /// Like [`standard_id`](Self::standard_id) but an error when absent.
    pub fn require_standard(&self, code: &str) -> EngineResult<RowId> {
        self.standard_id(code)
            .ok_or_else(|| EngineError::reference_not_found("standard", code))
    }

    pub fn pressure_class_id(&self, standard_id: RowId, designation: &str) -> Option<RowId> {
        self.index
            .pressure_classes
            .find(&self.pressure_classes, &(standard_id, designation.to_string()), pressure_class_key)
            .map(|pos| self.pressure_classes[pos].id)
    }

    pub fn flange_type_id(&self, code: &str) -> Option<RowId> {
        self.index
            .flange_types
            .find(&self.flange_types, &code.to_string(), flange_type_key)
            .map(|pos| self.flange_types[pos].id)
    }

    pub fn nominal_od_id(&self, nominal_diameter_mm: u32) -> Option<RowId> {
        self.index
            .nominal_outside_diameters
            .find(&self.nominal_outside_diameters, &nominal_diameter_mm, nominal_od_key)
            .map(|pos| self.nominal_outside_diameters[pos].id)
    }

    pub fn bolt_id(&self, designation: &str) -> Option<RowId> {
        self.index
            .bolts
            .find(&self.bolts, &designation.to_string(), bolt_key)
            .map(|pos| self.bolts[pos].id)
    }

    /// Find a flange row by its natural key.
    pub fn flange_dimension(
        &self,
        nominal_outside_diameter_id: RowId,
        standard_id: RowId,
        pressure_class_id: RowId,
        flange_type_id: Option<RowId>,
    ) -> Option<&FlangeDimension> {
        let key = (nominal_outside_diameter_id, standard_id, pressure_class_id, flange_type_id);
        self.index
            .flange_dimensions
            .find(&self.flange_dimensions, &key, flange_key)
            .map(|pos| &self.flange_dimensions[pos])
    }

    // ========================================================================
    // Flange catalog upserts
    // ========================================================================

    pub fn upsert_standard(&mut self, code: &str) -> RowId {
        let key = code.to_string();
        if let Some(pos) = self.index.standards.locate(&self.standards, &key, standard_key) {
            return self.standards[pos].id;
        }
        let id = next_id(&self.standards, |s| s.id);
        self.standards.push(Standard { id, code: key.clone() });
        self.index.standards.record(key, self.standards.len() - 1);
        id
    }

    pub fn upsert_pressure_class(&mut self, standard_id: RowId, designation: &str) -> RowId {
        let key = (standard_id, designation.to_string());
        if let Some(pos) = self
            .index
            .pressure_classes
            .locate(&self.pressure_classes, &key, pressure_class_key)
        {
            return self.pressure_classes[pos].id;
        }
        let id = next_id(&self.pressure_classes, |pc| pc.id);
        self.pressure_classes.push(PressureClass {
            id,
            standard_id,
            designation: designation.to_string(),
        });
        self.index.pressure_classes.record(key, self.pressure_classes.len() - 1);
        id
    }

    /// Insert or rename a flange type; the code is the key.
    pub fn upsert_flange_type(&mut self, code: &str, name: &str, standard_reference: &str) -> RowId {
        let key = code.to_string();
        if let Some(pos) = self.index.flange_types.locate(&self.flange_types, &key, flange_type_key) {
            let existing = &mut self.flange_types[pos];
            existing.name = name.to_string();
            existing.standard_reference = standard_reference.to_string();
            return existing.id;
        }
        let id = next_id(&self.flange_types, |t| t.id);
        self.flange_types.push(FlangeType {
            id,
            code: key.clone(),
            name: name.to_string(),
            standard_reference: standard_reference.to_string(),
        });
        self.index.flange_types.record(key, self.flange_types.len() - 1);
        id
    }

    pub fn upsert_nominal_od(&mut self, nominal_diameter_mm: u32, outside_diameter_mm: f64) -> RowId {
        if let Some(pos) = self.index.nominal_outside_diameters.locate(
            &self.nominal_outside_diameters,
            &nominal_diameter_mm,
            nominal_od_key,
        ) {
            let existing = &mut self.nominal_outside_diameters[pos];
            existing.outside_diameter_mm = outside_diameter_mm;
            return existing.id;
        }
        let id = next_id(&self.nominal_outside_diameters, |n| n.id);
        self.nominal_outside_diameters.push(NominalOutsideDiameter {
            id,
            nominal_diameter_mm,
            outside_diameter_mm,
        });
        self.index
            .nominal_outside_diameters
            .record(nominal_diameter_mm, self.nominal_outside_diameters.len() - 1);
        id
    }

    /// Insert a flange row unless its natural key already exists.
    ///
    /// Returns the row id and whether a row was inserted. An existing row is
    /// left untouched; use [`correct_flange_dimension`](Self::correct_flange_dimension)
    /// to change it.
    pub fn insert_flange_dimension_if_absent(
        &mut self,
        nominal_outside_diameter_id: RowId,
        standard_id: RowId,
        pressure_class_id: RowId,
        flange_type_id: Option<RowId>,
        geometry: FlangeGeometry,
        bolt_id: Option<RowId>,
    ) -> (RowId, bool) {
        let key = (nominal_outside_diameter_id, standard_id, pressure_class_id, flange_type_id);
        if let Some(pos) = self
            .index
            .flange_dimensions
            .locate(&self.flange_dimensions, &key, flange_key)
        {
            return (self.flange_dimensions[pos].id, false);
        }
        let id = next_id(&self.flange_dimensions, |d| d.id);
        self.flange_dimensions.push(FlangeDimension {
            id,
            nominal_outside_diameter_id,
            standard_id,
            pressure_class_id,
            flange_type_id,
            d_outer: geometry.d_outer,
            b: geometry.b,
            d4: geometry.d4,
            f: geometry.f,
            num_holes: geometry.num_holes,
            d1: geometry.d1,
            bolt_id,
            pcd: geometry.pcd,
            mass_kg: geometry.mass_kg,
        });
        self.index.flange_dimensions.record(key, self.flange_dimensions.len() - 1);
        (id, true)
    }

    /// Overwrite geometry of an existing flange row in place.
    ///
    /// Raised-face fields (`d4`, `f`) are only replaced when the correction
    /// supplies a positive value. Returns `true` if a row was found.
    pub fn correct_flange_dimension(
        &mut self,
        nominal_outside_diameter_id: RowId,
        standard_id: RowId,
        pressure_class_id: RowId,
        flange_type_id: Option<RowId>,
        geometry: FlangeGeometry,
        bolt_id: Option<RowId>,
    ) -> bool {
        let key = (nominal_outside_diameter_id, standard_id, pressure_class_id, flange_type_id);
        let Some(pos) = self
            .index
            .flange_dimensions
            .locate(&self.flange_dimensions, &key, flange_key)
        else {
            return false;
        };
        let row = &mut self.flange_dimensions[pos];
        row.d_outer = geometry.d_outer;
        row.b = geometry.b;
        if geometry.d4 > 0.0 {
            row.d4 = geometry.d4;
        }
        if geometry.f > 0.0 {
            row.f = geometry.f;
        }
        row.num_holes = geometry.num_holes;
        row.d1 = geometry.d1;
        row.pcd = geometry.pcd;
        row.mass_kg = geometry.mass_kg;
        if bolt_id.is_some() {
            row.bolt_id = bolt_id;
        }
        true
    }

    // ========================================================================
    // Fastener and gasket upserts
    // ========================================================================

    /// Insert or update a bolt; `designation` is the key and `bolt.id` is ignored.
    pub fn upsert_bolt(&mut self, bolt: Bolt) -> RowId {
        let key = bolt_key(&bolt);
        if let Some(pos) = self.index.bolts.locate(&self.bolts, &key, bolt_key) {
            let id = self.bolts[pos].id;
            self.bolts[pos] = Bolt { id, ..bolt };
            return id;
        }
        let id = next_id(&self.bolts, |b| b.id);
        self.bolts.push(Bolt { id, ..bolt });
        self.index.bolts.record(key, self.bolts.len() - 1);
        id
    }

    pub fn upsert_bolt_mass(&mut self, bolt_id: RowId, length_mm: u32, mass_kg: f64) -> RowId {
        let key = (bolt_id, length_mm);
        if let Some(pos) = self.index.bolt_masses.locate(&self.bolt_masses, &key, bolt_mass_key) {
            let existing = &mut self.bolt_masses[pos];
            existing.mass_kg = mass_kg;
            return existing.id;
        }
        let id = next_id(&self.bolt_masses, |m| m.id);
        self.bolt_masses.push(BoltMass {
            id,
            bolt_id,
            length_mm,
            mass_kg,
        });
        self.index.bolt_masses.record(key, self.bolt_masses.len() - 1);
        id
    }

    /// Keyed by `(bolt_id, grade, nut_type)`; `nut.id` is ignored.
    pub fn upsert_nut_mass(&mut self, nut: NutMass) -> RowId {
        let key = nut_mass_key(&nut);
        if let Some(pos) = self.index.nut_masses.locate(&self.nut_masses, &key, nut_mass_key) {
            let existing = &mut self.nut_masses[pos];
            existing.mass_kg = nut.mass_kg;
            return existing.id;
        }
        let id = next_id(&self.nut_masses, |n| n.id);
        self.nut_masses.push(NutMass { id, ..nut });
        self.index.nut_masses.record(key, self.nut_masses.len() - 1);
        id
    }

    /// Keyed by `(designation, specification)`; `washer.id` is ignored.
    pub fn upsert_washer(&mut self, washer: Washer) -> RowId {
        let key = washer_key(&washer);
        if let Some(pos) = self.index.washers.locate(&self.washers, &key, washer_key) {
            let id = self.washers[pos].id;
            self.washers[pos] = Washer { id, ..washer };
            return id;
        }
        let id = next_id(&self.washers, |w| w.id);
        self.washers.push(Washer { id, ..washer });
        self.index.washers.record(key, self.washers.len() - 1);
        id
    }

    pub fn upsert_bolting_material(&mut self, group: BoltingMaterialGroup) {
        let key = bolting_material_key(&group);
        match self
            .index
            .bolting_materials
            .locate(&self.bolting_materials, &key, bolting_material_key)
        {
            Some(pos) => self.bolting_materials[pos] = group,
            None => {
                self.bolting_materials.push(group);
                self.index.bolting_materials.record(key, self.bolting_materials.len() - 1);
            }
        }
    }

    pub fn upsert_bnw_set(&mut self, set: BnwSet) {
        let key = bnw_key(&set);
        match self.index.bnw_sets.locate(&self.bnw_sets, &key, bnw_key) {
            Some(pos) => self.bnw_sets[pos] = set,
            None => {
                self.bnw_sets.push(set);
                self.index.bnw_sets.record(key, self.bnw_sets.len() - 1);
            }
        }
    }

    pub fn upsert_bolt_hole_count(&mut self, row: BoltHoleCount) {
        let key = hole_count_key(&row);
        match self
            .index
            .bolt_hole_counts
            .locate(&self.bolt_hole_counts, &key, hole_count_key)
        {
            Some(pos) => self.bolt_hole_counts[pos] = row,
            None => {
                self.bolt_hole_counts.push(row);
                self.index.bolt_hole_counts.record(key, self.bolt_hole_counts.len() - 1);
            }
        }
    }

    pub fn upsert_blank_flange_weight(&mut self, row: BlankFlangeWeight) {
        let key = blank_weight_key(&row);
        match self
            .index
            .blank_flange_weights
            .locate(&self.blank_flange_weights, &key, blank_weight_key)
        {
            Some(pos) => self.blank_flange_weights[pos] = row,
            None => {
                self.blank_flange_weights.push(row);
                self.index
                    .blank_flange_weights
                    .record(key, self.blank_flange_weights.len() - 1);
            }
        }
    }

    pub fn upsert_gasket_weight(&mut self, row: GasketWeight) {
        let key = gasket_key(&row);
        match self.index.gasket_weights.locate(&self.gasket_weights, &key, gasket_key) {
            Some(pos) => self.gasket_weights[pos] = row,
            None => {
                self.gasket_weights.push(row);
                self.index.gasket_weights.record(key, self.gasket_weights.len() - 1);
            }
        }
    }

    // ========================================================================
    // P-T ratings
    // ========================================================================

    /// Insert a rating, or overwrite the pressure when the triple already exists.
    pub fn upsert_pt_rating(
        &mut self,
        pressure_class_id: RowId,
        material_group: &str,
        temperature_celsius: i32,
        max_pressure_bar: f64,
    ) -> RowId {
        let key = (pressure_class_id, material_group.to_string(), temperature_celsius);
        if let Some(pos) = self.index.pt_ratings.locate(&self.pt_ratings, &key, pt_rating_key) {
            let existing = &mut self.pt_ratings[pos];
            existing.max_pressure_bar = max_pressure_bar;
            return existing.id;
        }
        let id = next_id(&self.pt_ratings, |r| r.id);
        self.pt_ratings.push(PtRating {
            id,
            pressure_class_id,
            material_group: material_group.to_string(),
            temperature_celsius,
            max_pressure_bar,
        });
        self.index.pt_ratings.record(key, self.pt_ratings.len() - 1);
        id
    }

    // ========================================================================
    // Thermoplastics
    // ========================================================================

    pub fn upsert_thermoplastic(&mut self, spec: ThermoplasticSpecification) {
        let key = thermoplastic_key(&spec);
        match self
            .index
            .thermoplastic_specs
            .locate(&self.thermoplastic_specs, &key, thermoplastic_key)
        {
            Some(pos) => self.thermoplastic_specs[pos] = spec,
            None => {
                self.thermoplastic_specs.push(spec);
                self.index
                    .thermoplastic_specs
                    .record(key, self.thermoplastic_specs.len() - 1);
            }
        }
    }

    /// Keyed by `(material, code)`; `fitting.id` is ignored.
    pub fn upsert_fitting_type(&mut self, fitting: FittingType) -> RowId {
        let key = fitting_type_key(&fitting);
        if let Some(pos) = self.index.fitting_types.locate(&self.fitting_types, &key, fitting_type_key) {
            let id = self.fitting_types[pos].id;
            self.fitting_types[pos] = FittingType { id, ..fitting };
            return id;
        }
        let id = next_id(&self.fitting_types, |f| f.id);
        self.fitting_types.push(FittingType { id, ..fitting });
        self.index.fitting_types.record(key, self.fitting_types.len() - 1);
        id
    }

    pub fn upsert_fitting_weight(&mut self, fitting_type_id: RowId, nominal_bore_mm: u32, weight_kg: f64) -> RowId {
        let key = (fitting_type_id, nominal_bore_mm);
        if let Some(pos) = self
            .index
            .fitting_weights
            .locate(&self.fitting_weights, &key, fitting_weight_key)
        {
            let existing = &mut self.fitting_weights[pos];
            existing.weight_kg = weight_kg;
            return existing.id;
        }
        let id = next_id(&self.fitting_weights, |w| w.id);
        self.fitting_weights.push(FittingWeight {
            id,
            fitting_type_id,
            nominal_bore_mm,
            weight_kg,
        });
        self.index.fitting_weights.record(key, self.fitting_weights.len() - 1);
        id
    }

    // ========================================================================
    // Ledger and diagnostics
    // ========================================================================

    pub fn is_applied(&self, version: u64) -> bool {
        self.applied.contains_key(&version)
    }

    /// Row count per table, keyed by table name.
    pub fn row_counts(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("standards", self.standards.len()),
            ("pressure_classes", self.pressure_classes.len()),
            ("flange_types", self.flange_types.len()),
            ("nominal_outside_diameters", self.nominal_outside_diameters.len()),
            ("flange_dimensions", self.flange_dimensions.len()),
            ("bolts", self.bolts.len()),
            ("bolt_masses", self.bolt_masses.len()),
            ("nut_masses", self.nut_masses.len()),
            ("washers", self.washers.len()),
            ("bolting_materials", self.bolting_materials.len()),
            ("bnw_sets", self.bnw_sets.len()),
            ("bolt_hole_counts", self.bolt_hole_counts.len()),
            ("blank_flange_weights", self.blank_flange_weights.len()),
            ("gasket_weights", self.gasket_weights.len()),
            ("pt_ratings", self.pt_ratings.len()),
            ("thermoplastic_specs", self.thermoplastic_specs.len()),
            ("fitting_types", self.fitting_types.len()),
            ("fitting_weights", self.fitting_weights.len()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(mass_kg: f64) -> FlangeGeometry {
        FlangeGeometry {
            d_outer: 460.0,
            b: 28.0,
            d4: 378.0,
            f: 4.0,
            num_holes: 12,
            d1: 26.0,
            pcd: 410.0,
            mass_kg,
        }
    }

    #[test]
    fn test_upserts_return_existing_ids() {
        let mut tables = ReferenceTables::new();
        let a = tables.upsert_standard("BS 4504");
        let b = tables.upsert_standard("SABS 1123");
        assert_eq!(tables.upsert_standard("BS 4504"), a);
        assert_ne!(a, b);

        let pc = tables.upsert_pressure_class(a, "PN16");
        assert_eq!(tables.upsert_pressure_class(a, "PN16"), pc);
        assert_ne!(tables.upsert_pressure_class(b, "PN16"), pc);
        assert_eq!(tables.pressure_classes.len(), 2);
    }

    #[test]
    fn test_flange_insert_is_check_then_insert() {
        let mut tables = ReferenceTables::new();
        let std = tables.upsert_standard("BS 4504");
        let pc = tables.upsert_pressure_class(std, "PN16");
        let nb = tables.upsert_nominal_od(300, 323.9);
        let ty = tables.upsert_flange_type("/2", "Weld Neck", "ASME B16.47");

        let (id, inserted) = tables.insert_flange_dimension_if_absent(nb, std, pc, Some(ty), geometry(24.5), None);
        assert!(inserted);
        let (again, inserted) = tables.insert_flange_dimension_if_absent(nb, std, pc, Some(ty), geometry(99.0), None);
        assert_eq!(id, again);
        assert!(!inserted);
        assert_eq!(tables.flange_dimensions[0].mass_kg, 24.5);

        // Null flange type is a distinct key
        let (_, inserted) = tables.insert_flange_dimension_if_absent(nb, std, pc, None, geometry(20.0), None);
        assert!(inserted);
        assert_eq!(tables.flange_dimensions.len(), 2);
    }

    #[test]
    fn test_correct_flange_dimension() {
        let mut tables = ReferenceTables::new();
        let std = tables.upsert_standard("BS 4504");
        let pc = tables.upsert_pressure_class(std, "PN16");
        let nb = tables.upsert_nominal_od(300, 323.9);
        tables.insert_flange_dimension_if_absent(nb, std, pc, None, geometry(24.5), None);

        let mut fixed = geometry(70.0);
        fixed.d4 = 0.0;
        assert!(tables.correct_flange_dimension(nb, std, pc, None, fixed, None));
        assert_eq!(tables.flange_dimensions[0].mass_kg, 70.0);
        assert_eq!(tables.flange_dimensions[0].d4, 378.0);

        let missing_nb = tables.upsert_nominal_od(400, 406.4);
        assert!(!tables.correct_flange_dimension(missing_nb, std, pc, None, fixed, None));
    }

    #[test]
    fn test_pt_rating_upsert_overwrites() {
        let mut tables = ReferenceTables::new();
        let id = tables.upsert_pt_rating(1, "Carbon Steel A105 (Group 1.1)", 38, 19.0);
        let again = tables.upsert_pt_rating(1, "Carbon Steel A105 (Group 1.1)", 38, 19.6);
        assert_eq!(id, again);
        assert_eq!(tables.pt_ratings.len(), 1);
        assert_eq!(tables.pt_ratings[0].max_pressure_bar, 19.6);
    }

    #[test]
    fn test_bulk_upserts_stay_keyed() {
        let mut tables = ReferenceTables::new();
        let mut ids = Vec::new();
        for temp in 0..2_000 {
            ids.push(tables.upsert_pt_rating(1, "Group 1.1", temp, 10.0));
        }
        for temp in 0..2_000 {
            assert_eq!(tables.upsert_pt_rating(1, "Group 1.1", temp, 12.0), ids[temp as usize]);
        }
        assert_eq!(tables.pt_ratings.len(), 2_000);
        assert!(tables.pt_ratings.iter().all(|r| r.max_pressure_bar == 12.0));
    }

    #[test]
    fn test_upsert_after_rows_removed_directly() {
        let mut tables = ReferenceTables::new();
        tables.upsert_standard("BS 4504");
        let sabs = tables.upsert_standard("SABS 1123");
        let asme = tables.upsert_standard("ASME B16.5");

        tables.standards.retain(|s| s.id != sabs);
        assert_eq!(tables.upsert_standard("ASME B16.5"), asme);
        assert_eq!(tables.standard_id("SABS 1123"), None);
        assert_eq!(tables.upsert_standard("SABS 1123"), 4);
        assert_eq!(tables.standards.len(), 3);
    }

    #[test]
    fn test_reindex_after_key_edited_in_place() {
        let mut tables = ReferenceTables::new();
        let id = tables.upsert_flange_type("/2", "Weld Neck", "SABS 1123");
        tables.upsert_flange_type("/3", "Slip On", "SABS 1123");
        tables.flange_types[0].code = "/8".to_string();
        tables.reindex();

        assert_eq!(tables.flange_type_id("/8"), Some(id));
        assert_eq!(tables.upsert_flange_type("/8", "Blank", "SABS 1123"), id);
        assert_eq!(tables.flange_type_id("/2"), None);
        assert_eq!(tables.flange_types.len(), 2);
    }

    #[test]
    fn test_key_cache_is_not_serialized_or_compared() {
        let mut tables = ReferenceTables::new();
        let std = tables.upsert_standard("BS 4504");
        tables.upsert_pressure_class(std, "PN16");
        let json = serde_json::to_string(&tables).unwrap();
        assert!(!json.contains("index"));

        let restored: ReferenceTables = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, tables);
        assert_eq!(restored.pressure_class_id(std, "PN16"), tables.pressure_class_id(std, "PN16"));
    }

    #[test]
    fn test_ids_continue_after_deserialize() {
        let mut tables = ReferenceTables::new();
        tables.upsert_standard("ASME B16.5");
        tables.upsert_standard("BS 10");
        let json = serde_json::to_string(&tables).unwrap();
        let mut restored: ReferenceTables = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.upsert_standard("SABS 1123"), 3);
        assert_eq!(restored.row_counts()["standards"], 3);
    }
}
