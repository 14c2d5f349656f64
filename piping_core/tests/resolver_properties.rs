//! Property tests over the fallback bands, the ring estimator and gasket bucketing.

use piping_core::config::RetainingRingConfig;
use piping_core::estimator::retaining_ring;
use piping_core::reference::{builtin_store, GasketKind};
use piping_core::resolvers::dimensional::size_band_flange_weight;
use piping_core::resolvers::fasteners::gasket_weight;
use piping_core::thermoplastic::{pressure_rating, recommended_sdr, PolyethyleneGrade};
use proptest::prelude::*;

proptest! {
    #[test]
    fn band_weight_never_decreases(a in 1u32..3000, b in 1u32..3000) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(size_band_flange_weight(small) <= size_band_flange_weight(large));
    }

    #[test]
    fn ring_mass_grows_with_pipe_od(od in 100.0f64..1500.0, step in 50.0f64..500.0) {
        let store = builtin_store();
        let config = RetainingRingConfig::default();
        let smaller = retaining_ring(&store, &config, 200, Some(od));
        let larger = retaining_ring(&store, &config, 200, Some(od + step));
        prop_assert!(larger.weight_kg > smaller.weight_kg);
        prop_assert!(smaller.weight_kg > 0.0);
    }

    #[test]
    fn ring_without_projection_has_no_mass(nb in 15u32..1200) {
        let store = builtin_store();
        let config = RetainingRingConfig { od_multiplier: 1.0, ..RetainingRingConfig::default() };
        let ring = retaining_ring(&store, &config, nb, None);
        prop_assert_eq!(ring.ring_od_mm, ring.ring_id_mm);
        prop_assert_eq!(ring.weight_kg, 0.0);
    }

    #[test]
    fn gasket_between_sizes_uses_lower_size(index in 0usize..64, offset in 0u32..1000) {
        let store = builtin_store();
        let rows = store.gasket_weights();
        prop_assume!(rows.len() >= 2);
        let i = index % (rows.len() - 1);
        let (lower, upper) = (&rows[i], &rows[i + 1]);
        let nb = lower.nominal_bore_mm + offset % (upper.nominal_bore_mm - lower.nominal_bore_mm);
        prop_assert_eq!(gasket_weight(&store, "SW-", nb), lower.mass_for(GasketKind::SpiralWound));
    }

    #[test]
    fn recommended_sdr_meets_reachable_targets(target in 0.5f64..25.0) {
        let sdr = recommended_sdr(target, PolyethyleneGrade::Pe100, 1.25, 11.0);
        prop_assert!(pressure_rating(sdr, PolyethyleneGrade::Pe100, 1.25) >= target);
    }
}
