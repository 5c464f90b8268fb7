// tests/engine_tests.rs
use ts_index::{
    compute_index, compute_index_named, ArdFrame, ArdStack, CitationRegistry, EngineError,
    Endmembers, SensorBands, SmaParams, SpectralIndex, TsOutput, TsaParams,
};

const NODATA: i16 = -9999;

/// One-date stack holding a single valid pixel with the given band values.
fn single_pixel(bands: &[i16]) -> ArdStack {
    let planes = bands.iter().map(|&v| vec![v]).collect();
    ArdStack::new(vec![ArdFrame::new(planes, vec![1]).unwrap()]).unwrap()
}

/// Multi-pixel, one-date stack from per-band planes.
fn single_date(planes: Vec<Vec<i16>>, mask: Vec<u8>) -> ArdStack {
    ArdStack::new(vec![ArdFrame::new(planes, mask).unwrap()]).unwrap()
}

fn run(stack: &ArdStack, index: SpectralIndex, sensor: &SensorBands) -> TsOutput {
    let mut out = TsOutput::new(stack.ndates(), stack.ncells());
    compute_index(
        stack,
        None,
        &mut out,
        index,
        NODATA,
        &TsaParams::default(),
        sensor,
        None,
        &CitationRegistry::new(),
    )
    .unwrap();
    out
}

fn run_sma(stack: &ArdStack, sma: SmaParams, endmembers: &Endmembers) -> TsOutput {
    let mut out = if sma.emit_rms {
        TsOutput::with_residuals(stack.ndates(), stack.ncells())
    } else {
        TsOutput::new(stack.ndates(), stack.ncells())
    };
    let tsa = TsaParams {
        sma,
        ..TsaParams::default()
    };
    compute_index(
        stack,
        None,
        &mut out,
        SpectralIndex::Sma,
        NODATA,
        &tsa,
        &SensorBands::landsat_oli(),
        Some(endmembers),
        &CitationRegistry::new(),
    )
    .unwrap();
    out
}

/// Test NDVI with known values (Landsat layout: blue,green,red,nir,swir1,swir2).
#[test]
fn test_ndvi_known_values() {
    let test_cases = [
        // red, nir, expected (scale 10000)
        (1000, 3000, 5000),  // (3000-1000)/(3000+1000)
        (2500, 5000, 3333),  // truncation toward zero
        (3000, 3000, 0),
        (0, 0, NODATA),      // divide by zero
    ];
    let sensor = SensorBands::landsat_oli();
    for (red, nir, expected) in test_cases {
        let stack = single_pixel(&[0, 0, red, nir, 0, 0]);
        let out = run(&stack, SpectralIndex::Ndvi, &sensor);
        assert_eq!(out.tss(0, 0), expected, "red={red} nir={nir}");
    }
}

/// Test the EVI preset: 2.5*(nir-red)/(nir + 6*red - 7.5*blue + 10000).
#[test]
fn test_evi_preset() {
    let stack = single_pixel(&[500, 0, 1000, 3000, 0, 0]);
    let out = run(&stack, SpectralIndex::Evi, &SensorBands::landsat_oli());
    // D = 3000 + 6000 - 3750 + 10000 = 15250; 2.5*2000/15250 = 0.32786
    assert_eq!(out.tss(0, 0), 3278);
}

/// Test the two-band EVI2 preset, which substitutes red for blue.
#[test]
fn test_evi2_preset() {
    let stack = single_pixel(&[0, 0, 1000, 3000, 0, 0]);
    let out = run(&stack, SpectralIndex::Evi2, &SensorBands::landsat_oli());
    // D = 3000 + 1000 + 10000 = 14000; 2.4*2000/14000 = 0.342857
    assert_eq!(out.tss(0, 0), 3428);
}

/// Test ARVI red-blue correction: red <- 2*red - blue before the formula.
#[test]
fn test_arvi_red_blue_correction() {
    let stack = single_pixel(&[500, 0, 1000, 3000, 0, 0]);
    let out = run(&stack, SpectralIndex::Arvi, &SensorBands::landsat_oli());
    // corrected red = 1500; D = 3000 + 1500 = 4500; (3000-1500)/4500 = 1/3
    assert_eq!(out.tss(0, 0), 3333);
}

/// Test Tasseled Cap brightness on literal inputs.
#[test]
fn test_tasseled_brightness() {
    let stack = single_pixel(&[500, 700, 900, 3000, 1500, 1000]);
    let out = run(&stack, SpectralIndex::Tcb, &SensorBands::landsat_oli());
    // 0.2043*500 + 0.4158*700 + 0.5524*900 + 0.5741*3000
    //   + 0.3124*1500 + 0.2303*1000 = 3311.57
    assert_eq!(out.tss(0, 0), 3311);
}

/// Test the disturbance composite against its component identity.
#[test]
fn test_tasseled_disturbance_identity() {
    let sensor = SensorBands::landsat_oli();
    let stack = single_pixel(&[420, 650, 880, 2600, 1700, 950]);
    let tcb = run(&stack, SpectralIndex::Tcb, &sensor).tss(0, 0) as i32;
    let tcg = run(&stack, SpectralIndex::Tcg, &sensor).tss(0, 0) as i32;
    let tcw = run(&stack, SpectralIndex::Tcw, &sensor).tss(0, 0) as i32;
    let tcd = run(&stack, SpectralIndex::Tcd, &sensor).tss(0, 0) as i32;
    // components truncate individually, the composite truncates once
    assert!((tcd - (tcb - tcg - tcw)).abs() <= 1, "tcd={tcd}");
}

/// Test continuum removal between nir and swir2.
#[test]
fn test_continuum_removal() {
    let sensor = SensorBands {
        nir: Some(3),
        swir1: Some(4),
        swir2: Some(5),
        w_nir: Some(0.86),
        w_swir1: Some(1.61),
        w_swir2: Some(2.20),
        ..SensorBands::default()
    };
    let stack = single_pixel(&[0, 0, 0, 2000, 1600, 1200]);
    let out = run(&stack, SpectralIndex::Csw, &sensor);
    // baseline = (2000*0.59 + 1200*0.75)/1.34 = 1552.24
    assert_eq!(out.tss(0, 0), 47);
}

/// Test CIre scaling (1000) and its overflow-to-nodata policy.
#[test]
fn test_ratio_minus_one() {
    let sensor = SensorBands::sentinel2();
    // rededge1 = band 3, rededge3 = band 5
    let stack = single_pixel(&[0, 0, 0, 1000, 0, 3000, 0, 0, 0, 0]);
    let out = run(&stack, SpectralIndex::CiRe, &sensor);
    assert_eq!(out.tss(0, 0), 2000);

    let stack = single_pixel(&[0, 0, 0, 1, 0, 32767, 0, 0, 0, 0]);
    let out = run(&stack, SpectralIndex::CiRe, &sensor);
    assert_eq!(out.tss(0, 0), NODATA, "scaled ratio must overflow to nodata");

    let stack = single_pixel(&[0, 0, 0, 0, 0, 3000, 0, 0, 0, 0]);
    let out = run(&stack, SpectralIndex::CiRe, &sensor);
    assert_eq!(out.tss(0, 0), NODATA, "zero denominator");
}

/// Test the modified simple ratio on a literal case.
#[test]
fn test_modified_simple_ratio() {
    let sensor = SensorBands::sentinel2();
    // bnir = band 6, rededge1 = band 3
    let stack = single_pixel(&[0, 0, 0, 1000, 0, 0, 4000, 0, 0, 0]);
    let out = run(&stack, SpectralIndex::MsrRe, &sensor);
    // (4-1)/sqrt(5) = 1.34164
    assert_eq!(out.tss(0, 0), 13416);
}

/// Test kernelized NDVI value and range.
#[test]
fn test_kernelized_ndvi() {
    let sensor = SensorBands::landsat_oli();
    let stack = single_pixel(&[0, 0, 1000, 3000, 0, 0]);
    let out = run(&stack, SpectralIndex::KNdvi, &sensor);
    // sigma=2000, k=exp(-0.5); (1-k)/(1+k) = 0.24491
    assert_eq!(out.tss(0, 0), 2449);

    // negative band is invalid
    let stack = single_pixel(&[0, 0, -10, 3000, 0, 0]);
    let out = run(&stack, SpectralIndex::KNdvi, &sensor);
    assert_eq!(out.tss(0, 0), NODATA);

    // strictly positive bands stay in [0, 10000]
    for (red, nir) in [(1, 9000), (4000, 4000), (8000, 2)] {
        let stack = single_pixel(&[0, 0, red, nir, 0, 0]);
        let v = run(&stack, SpectralIndex::KNdvi, &sensor).tss(0, 0);
        assert!((0..=10000).contains(&v), "kndvi({red},{nir}) = {v}");
    }
}

/// Test that band copies are lossless under the mask logic.
#[test]
fn test_band_copy_lossless() {
    let sensor = SensorBands::landsat_oli();
    let planes = vec![
        vec![11, -7, 300],
        vec![0; 3],
        vec![0; 3],
        vec![0; 3],
        vec![0; 3],
        vec![0; 3],
    ];
    let stack = single_date(planes, vec![1, 1, 0]);
    let out = run(&stack, SpectralIndex::Blue, &sensor);
    assert_eq!(out.tss(0, 0), 11);
    assert_eq!(out.tss(0, 1), -7);
    assert_eq!(out.tss(0, 2), NODATA, "frame mask applies to band copies");
}

/// Test that the global mask and the per-frame mask both force nodata.
#[test]
fn test_mask_dominance() {
    let sensor = SensorBands::landsat_oli();
    let frame_t0 = ArdFrame::new(
        vec![vec![0; 2], vec![0; 2], vec![1000; 2], vec![3000; 2], vec![0; 2], vec![0; 2]],
        vec![1, 1],
    )
    .unwrap();
    let frame_t1 = ArdFrame::new(
        vec![vec![0; 2], vec![0; 2], vec![1000; 2], vec![3000; 2], vec![0; 2], vec![0; 2]],
        vec![0, 1], // pixel 0 invalid on the second date
    )
    .unwrap();
    let stack = ArdStack::new(vec![frame_t0, frame_t1]).unwrap();

    let global = vec![1u8, 0u8]; // pixel 1 disabled everywhere
    let mut out = TsOutput::new(2, 2);
    compute_index(
        &stack,
        Some(&global),
        &mut out,
        SpectralIndex::Ndvi,
        NODATA,
        &TsaParams::default(),
        &sensor,
        None,
        &CitationRegistry::new(),
    )
    .unwrap();

    assert_eq!(out.tss(0, 0), 5000);
    assert_eq!(out.tss(1, 0), NODATA, "frame mask");
    assert_eq!(out.tss(0, 1), NODATA, "global mask");
    assert_eq!(out.tss(1, 1), NODATA, "global mask");
}

/// Test NDVI antisymmetry by swapping the band roles.
#[test]
fn test_ndvi_symmetry() {
    let forward = SensorBands::landsat_oli();
    let mut swapped = SensorBands::landsat_oli();
    swapped.nir = forward.red;
    swapped.red = forward.nir;

    for (red, nir) in [(1000, 3000), (2700, 400), (5000, 5000)] {
        let stack = single_pixel(&[0, 0, red, nir, 0, 0]);
        let a = run(&stack, SpectralIndex::Ndvi, &forward).tss(0, 0);
        let b = run(&stack, SpectralIndex::Ndvi, &swapped).tss(0, 0);
        assert_eq!(a, -b, "red={red} nir={nir}");
    }
}

/// Test that normalized differences stay within the scaled [-1, 1] band.
#[test]
fn test_normalized_difference_bound() {
    let sensor = SensorBands::landsat_oli();
    let cases = [(-200, 1000), (30, -20), (12000, 1), (0, 0), (-500, 500)];
    for (red, nir) in cases {
        let stack = single_pixel(&[0, 0, red, nir, 0, 0]);
        let v = run(&stack, SpectralIndex::Ndvi, &sensor).tss(0, 0);
        assert!(
            v == NODATA || (-10000..=10000).contains(&v),
            "ndvi({red},{nir}) = {v}"
        );
    }
}

/// Test SMA on an exact two-endmember mixture (constrained, sum-to-one).
#[test]
fn test_sma_exact_mixture() {
    let endmembers = Endmembers::from_rows(vec![vec![0.1, 0.4], vec![0.5, 0.2]]).unwrap();
    // x = 0.5*E1 + 0.5*E2 = (0.25, 0.35)
    let stack = single_pixel(&[2500, 3500]);
    let sma = SmaParams {
        positivity: true,
        sum_to_one: true,
        emit_rms: true,
        endmember: 1,
        ..SmaParams::default()
    };
    let out = run_sma(&stack, sma, &endmembers);
    let v = out.tss(0, 0);
    assert!((4998..=5002).contains(&v), "fraction = {v}");
    // exact mixture leaves no residual
    assert_eq!(out.rms(0, 0), Some(0));
}

/// Test that unconstrained sum-to-one unmixing recovers the convex weights.
#[test]
fn test_sma_unconstrained_sum_to_one() {
    let endmembers = Endmembers::from_rows(vec![vec![0.1, 0.4], vec![0.5, 0.2]]).unwrap();
    let stack = single_pixel(&[2500, 3500]);
    let sma = SmaParams {
        positivity: false,
        sum_to_one: true,
        endmember: 2,
        ..SmaParams::default()
    };
    let out = run_sma(&stack, sma, &endmembers);
    let v = out.tss(0, 0);
    assert!((4998..=5002).contains(&v), "fraction = {v}");
}

/// Test that constrained fractions never go negative.
#[test]
fn test_sma_non_negativity() {
    let endmembers = Endmembers::from_rows(vec![vec![0.1, 0.4], vec![0.5, 0.2]]).unwrap();
    // outside the endmember cone; unconstrained would need d[0] < 0
    let stack = single_pixel(&[5000, 1000]);
    for retained in [1usize, 2] {
        let sma = SmaParams {
            positivity: true,
            sum_to_one: false,
            endmember: retained,
            ..SmaParams::default()
        };
        let out = run_sma(&stack, sma.clone(), &endmembers);
        assert!(out.tss(0, 0) >= 0, "endmember {retained}");
    }
}

/// Test shade normalization with the shade spectrum as last endmember.
#[test]
fn test_sma_shade_normalization() {
    let endmembers = Endmembers::from_rows(vec![
        vec![0.1, 0.4, 0.02],
        vec![0.5, 0.2, 0.02],
    ])
    .unwrap();
    // x = 0.4*E1 + 0.4*E2 + 0.2*shade = (0.204, 0.284)
    let stack = single_pixel(&[2040, 2840]);
    let base = SmaParams {
        positivity: true,
        sum_to_one: true,
        shade_normalize: true,
        ..SmaParams::default()
    };

    let sma = SmaParams {
        endmember: 1,
        ..base.clone()
    };
    let v = run_sma(&stack, sma, &endmembers).tss(0, 0);
    // 0.4 rescaled by 1/(1-0.2)
    assert!((4998..=5002).contains(&v), "normalized fraction = {v}");

    let sma = SmaParams {
        endmember: 3,
        ..base
    };
    let v = run_sma(&stack, sma, &endmembers).tss(0, 0);
    assert_eq!(v, 0, "shade fraction is zeroed after normalization");
}

/// Test the SMA structural error contract.
#[test]
fn test_sma_contract_errors() {
    let stack = single_pixel(&[2500, 3500]);
    let sensor = SensorBands::landsat_oli();
    let registry = CitationRegistry::new();
    let tsa = TsaParams::default();
    let mut out = TsOutput::new(1, 1);

    // no endmember table
    let err = compute_index(
        &stack, None, &mut out, SpectralIndex::Sma, NODATA, &tsa, &sensor, None, &registry,
    );
    assert!(matches!(err, Err(EngineError::MissingEndmembers)));

    // band-count mismatch
    let three_band =
        Endmembers::from_rows(vec![vec![0.1], vec![0.5], vec![0.3]]).unwrap();
    let err = compute_index(
        &stack,
        None,
        &mut out,
        SpectralIndex::Sma,
        NODATA,
        &tsa,
        &sensor,
        Some(&three_band),
        &registry,
    );
    assert!(matches!(
        err,
        Err(EngineError::EndmemberBands {
            endmember: 3,
            stack: 2
        })
    ));

    // residuals requested but no rms planes allocated
    let endmembers = Endmembers::from_rows(vec![vec![0.1, 0.4], vec![0.5, 0.2]]).unwrap();
    let tsa_rms = TsaParams {
        sma: SmaParams {
            emit_rms: true,
            ..SmaParams::default()
        },
        ..TsaParams::default()
    };
    let err = compute_index(
        &stack,
        None,
        &mut out,
        SpectralIndex::Sma,
        NODATA,
        &tsa_rms,
        &sensor,
        Some(&endmembers),
        &registry,
    );
    assert!(matches!(err, Err(EngineError::MissingResidualPlanes)));
}

/// Test that a missing band role surfaces as an error, not a panic.
#[test]
fn test_missing_band_role() {
    let stack = single_pixel(&[0, 0, 1000, 3000, 0, 0]);
    let mut out = TsOutput::new(1, 1);
    let err = compute_index(
        &stack,
        None,
        &mut out,
        SpectralIndex::Vv,
        NODATA,
        &TsaParams::default(),
        &SensorBands::landsat_oli(),
        None,
        &CitationRegistry::new(),
    );
    assert!(matches!(err, Err(EngineError::MissingBand(_))));
}

/// Test the unknown-identifier policy of the string entry point.
#[test]
fn test_unknown_identifier_is_success() {
    let stack = single_pixel(&[0, 0, 1000, 3000, 0, 0]);
    let mut out = TsOutput::new(1, 1);
    let result = compute_index_named(
        &stack,
        None,
        &mut out,
        "NOT-AN-INDEX",
        NODATA,
        &TsaParams::default(),
        &SensorBands::landsat_oli(),
        None,
        &CitationRegistry::new(),
    );
    assert!(result.is_ok());
    assert_eq!(out.tss(0, 0), 0, "output left untouched");
}

/// Test that repeated runs on identical inputs produce identical outputs.
#[test]
fn test_determinism() {
    let endmembers = Endmembers::from_rows(vec![vec![0.1, 0.4], vec![0.5, 0.2]]).unwrap();
    let planes = vec![
        (0..64).map(|i| 2000 + 17 * i as i16).collect::<Vec<_>>(),
        (0..64).map(|i| 3500 - 11 * i as i16).collect::<Vec<_>>(),
    ];
    let stack = single_date(planes, vec![1; 64]);
    let sma = SmaParams {
        positivity: true,
        sum_to_one: true,
        emit_rms: true,
        ..SmaParams::default()
    };
    let a = run_sma(&stack, sma.clone(), &endmembers);
    let b = run_sma(&stack, sma, &endmembers);
    for p in 0..64 {
        assert_eq!(a.tss(0, p), b.tss(0, p), "pixel {p}");
        assert_eq!(a.rms(0, p), b.rms(0, p), "pixel {p}");
    }
}

/// Test that job parameters deserialize from the host's JSON config shape.
#[test]
fn test_params_from_json() {
    let tsa: TsaParams = serde_json::from_str(
        r#"{
            "indices": ["NDVI", "TCW", "SMA"],
            "sma": { "emit_rms": true, "endmember": 2 }
        }"#,
    )
    .unwrap();
    assert_eq!(
        tsa.indices,
        vec![SpectralIndex::Ndvi, SpectralIndex::Tcw, SpectralIndex::Sma]
    );
    assert!(tsa.sma.emit_rms);
    assert!(tsa.sma.positivity, "defaults apply to omitted fields");
    assert_eq!(tsa.sma.endmember, 2);

    assert!(serde_json::from_str::<TsaParams>(r#"{"indices":["NOPE"]}"#).is_err());
}
