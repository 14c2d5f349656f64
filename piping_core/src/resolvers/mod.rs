//! # Resolvers
//!
//! Pure lookups over a [`ReferenceDataStore`](crate::reference::ReferenceDataStore).
//! None of them fail for missing data: each has a documented fallback.
//!
//! - [`dimensional`] - flange mass and geometry, blank flanges, type catalogs
//! - [`fasteners`] - BNW sets, bolting materials, gaskets
//! - [`material`] - material group mapping and P-T ratings

pub mod dimensional;
pub mod fasteners;
pub mod material;

pub use dimensional::{
    blank_flange_surface_area, blank_flange_weight, bolt_holes_per_flange, catalog_standard_for, flange_dimension,
    flange_types_for_standard, flange_weight, resolve_flange_weight, sans_blank_flange_weight,
    BlankFlangeSurfaceArea, FlangeWeight, FlangeWeightTier,
};
pub use fasteners::{bnw_set_info, bolting_materials, computed_bnw_weight_per_hole, gasket_kind, gasket_weight, BnwSetInfo};
pub use material::{
    asme_group_number, available_pt_rating_groups, catalogued_temperatures, pt_rating, pt_rating_for,
    pt_rating_material_group, snap_temperature_up,
};
