//! Integration tests for the formula to mesh/polyline to export pipeline

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use formscape_core::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

#[test]
fn every_builtin_generates_a_valid_mesh() {
    let registry = Registry::builtin();
    let options = MeshOptions::default().with_lattice(16, 16).with_resolution(12);

    for (name, field) in registry.iter() {
        let mesh = generate_mesh(field, &Params::new(), &options)
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        mesh.validate().unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(
            mesh.positions.iter().flatten().all(|c| c.is_finite()),
            "{name} has non-finite positions"
        );
    }
}

#[test]
fn every_2d_builtin_generates_a_polyline() {
    let registry = Registry::builtin();
    for (name, field) in registry.iter() {
        let result = generate_polyline(field, &Params::new(), 50);
        if field.supports(Dimension::Two) && field.plot_strategy().is_some() {
            let line = result.unwrap_or_else(|e| panic!("{name}: {e}"));
            assert_eq!(line.len(), 51, "{name}");
            assert_eq!(line.x.len(), line.y.len());
        } else {
            assert!(matches!(result, Err(Error::UnsupportedDimension { .. })), "{name}");
        }
    }
}

#[test]
fn user_formula_to_obj() {
    let field: ScalarField = UserExpression::new(
        "Blob",
        "Lumpy sphere",
        "=radius + 0.2*sin(5*phi)*sin(3*theta)",
        None,
    )
    .expect("formula is valid")
    .into();

    assert_eq!(field.descriptor().parameters.len(), 1);
    let params = Params::from([("radius", 1.5)]);
    let mesh = generate_mesh(&field, &params, &MeshOptions::default().with_lattice(24, 12))
        .expect("mesh generates");
    assert_eq!(mesh.vertex_count(), 25 * 13);

    let path = std::env::temp_dir().join("formscape_test_blob.obj");
    mesh.export(&path).expect("export succeeds");
    let text = std::fs::read_to_string(&path).expect("file exists");
    assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 25 * 13);
    assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 24 * 12 * 2);
    std::fs::remove_file(&path).ok();
}

#[test]
fn polyline_to_csv() {
    let registry = Registry::builtin();
    let line = generate_polyline(
        registry.resolve("cartesianSine").expect("builtin"),
        &Params::new(),
        20,
    )
    .expect("plot succeeds");

    let path = std::env::temp_dir().join("formscape_test_sine.csv");
    line.export(&path).expect("export succeeds");
    let text = std::fs::read_to_string(&path).expect("file exists");
    assert_eq!(text.lines().count(), 22);
    assert!(text.starts_with("x,y\n-5,"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn preset_file_drives_generation() {
    let registry = Registry::builtin();
    let preset = Preset::new("gyroid")
        .with_params(Params::from([("scale", 0.8), ("threshold", 0.1)]))
        .with_mesh(MeshOptions::default().with_resolution(10).with_smoothing(1));

    let path = std::env::temp_dir().join("formscape_test_preset.json");
    preset.save(&path).expect("save succeeds");
    let loaded = Preset::load(&path).expect("load succeeds");
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, preset);

    let mesh = loaded.generate_mesh(&registry).expect("mesh generates");
    assert!(mesh.triangle_count() > 0);
    mesh.validate().expect("mesh is valid");
}

#[test]
fn noise_fields_are_seeded() {
    let registry = Registry::builtin();
    let options = MeshOptions::default().with_lattice(10, 10);

    for name in ["terrainGen", "cellularNoise", "simplexTerrain"] {
        let field = registry.resolve(name).expect("builtin");
        let a = generate_mesh(field, &Params::from([("seed", 7.0)]), &options).expect("mesh");
        let b = generate_mesh(field, &Params::from([("seed", 7.0)]), &options).expect("mesh");
        let c = generate_mesh(field, &Params::from([("seed", 8.0)]), &options).expect("mesh");
        assert_eq!(a, b, "{name} is not reproducible");
        assert_ne!(a.positions, c.positions, "{name} ignores its seed");
    }
}

#[test]
fn randomized_params_stay_in_range() {
    let registry = Registry::builtin();
    let field = registry.resolve("gielis").expect("builtin");
    let descriptor = field.descriptor();
    let mut params = descriptor.default_params();
    let locked: HashSet<String> = ["m".to_string()].into_iter().collect();
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..20 {
        randomize(descriptor, &mut params, &locked, &mut rng);
        assert_eq!(params.get("m"), Some(6.0));
        for p in &descriptor.parameters {
            let v = params.get(&p.key).expect("every parameter is set");
            assert!((p.min..=p.max).contains(&v), "{} = {v}", p.key);
        }
        field.evaluate(&params.clone().with("phi", 0.3)).expect("evaluates");
    }
}

#[test]
fn status_messages() {
    let registry = Registry::builtin();
    let err = registry.resolve("nope").unwrap_err();
    assert_eq!(err.to_string(), "Formula type 'nope' not found");

    let err = UserExpression::new("Bad", "", "sin(x)", None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid formula");

    assert!(!validate("=sin(x+"));
    assert_eq!(evaluate("=sin(x)+cos(y)", &Params::from([("x", 0.0), ("y", 0.0)])).unwrap(), 1.0);
}
