use std::collections::HashMap;

use swatch_api_core::Color;
use swatch_graph_core::{
    find_output, Appearance, MaterialGraph, MaterialResolver, NodeGraph, ResolverConfig,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn approx_color(a: Color, b: Color) {
    for channel in 0..4 {
        approx(a.0[channel], b.0[channel], 1e-5);
    }
}

fn approx_appearance(name: &str, got: &Appearance, want: &Appearance) {
    println!("{name}: {got:?}");
    approx_color(got.base_color, want.base_color);
    approx(got.metallic, want.metallic, 1e-5);
    approx(got.roughness, want.roughness, 1e-5);
}

fn load(name: &str) -> MaterialGraph {
    let json = swatch_test_fixtures::material_graphs::graph_json(name)
        .unwrap_or_else(|e| panic!("load {name} fixture: {e:#}"));
    MaterialGraph::from_json_str(&json).unwrap_or_else(|e| panic!("build {name} graph: {e}"))
}

fn config(name: &str) -> ResolverConfig {
    let json = swatch_test_fixtures::configs::json(name)
        .unwrap_or_else(|e| panic!("load {name} config: {e:#}"));
    ResolverConfig::from_json_str(&json).expect("config parses")
}

fn resolve_all(graph: &MaterialGraph, resolver: &MaterialResolver) -> HashMap<String, Appearance> {
    resolver.resolve_all(graph).into_iter().collect()
}

#[test]
fn every_fixture_matches_its_expected_appearances() {
    let resolver = MaterialResolver::default();
    for name in swatch_test_fixtures::material_graphs::keys() {
        let graph = load(&name);
        let expected: HashMap<String, Appearance> =
            swatch_test_fixtures::material_graphs::expected(&name)
                .expect("expected fixture parses")
                .expect("every material fixture carries expectations");
        let resolved = resolve_all(&graph, &resolver);

        assert_eq!(
            resolved.len(),
            expected.len(),
            "{name}: resolved {:?}",
            resolved.keys().collect::<Vec<_>>()
        );
        for (material, want) in &expected {
            let got = resolved
                .get(material)
                .unwrap_or_else(|| panic!("{name}: material {material} not resolved"));
            approx_appearance(material, got, want);
        }
    }
}

#[test]
fn materials_without_nodes_are_not_resolved() {
    let graph = load("principled");
    let resolver = MaterialResolver::default();
    assert_eq!(resolver.resolve_material(&graph, "Flat").expect("known"), None);
    assert!(!resolver
        .resolve_all(&graph)
        .iter()
        .any(|(name, _)| name == "Flat"));
}

#[test]
fn table_overrides_give_custom_nodes_meaning() {
    let graph = load("principled");
    let resolver = MaterialResolver::new(config("custom-tables"));
    let custom = resolver
        .resolve_material(&graph, "Custom")
        .expect("known")
        .expect("uses nodes");
    approx_color(custom.base_color, Color([0.1, 0.6, 0.2, 1.0]));
    approx(custom.roughness, 0.35, 1e-6);
    approx(custom.metallic, 0.0, 1e-6);
}

#[test]
fn lower_alpha_threshold_admits_faint_pixels() {
    let graph = load("textured");
    let resolver = MaterialResolver::new(config("custom-tables"));
    let ghost = resolver
        .resolve_material(&graph, "Ghost")
        .expect("known")
        .expect("uses nodes");
    approx_color(ghost.base_color, Color([0.6, 0.6, 0.6, 1.0]));
}

#[test]
fn configured_defaults_apply_where_graphs_are_silent() {
    let graph = load("principled");
    let resolver = MaterialResolver::new(config("contains"));
    let custom = resolver
        .resolve_material(&graph, "Custom")
        .expect("known")
        .expect("uses nodes");
    approx(custom.roughness, 0.8, 1e-6);
    // Socket defaults still win over the configured default.
    let brass = resolver
        .resolve_material(&graph, "Brass")
        .expect("known")
        .expect("uses nodes");
    approx(brass.roughness, 0.25, 1e-6);
}

#[test]
fn each_tree_output_matches_material_resolution() {
    let graph = load("groups");
    let resolver = MaterialResolver::default();
    for material in graph.materials() {
        let tree_name = material.node_tree.as_deref().expect("group fixture uses nodes");
        let tree = graph.tree(tree_name).expect("tree exists");
        let output = find_output(&graph, tree).expect("output node");
        assert_eq!(graph.type_identifier(output), "ShaderNodeOutputMaterial");
        assert_eq!(
            resolver.resolve_tree(&graph, tree),
            Some(resolver.resolve(&graph, output))
        );
    }
}

#[test]
fn resolution_is_repeatable() {
    let graph = load("groups");
    let resolver = MaterialResolver::default();
    let first = resolver.resolve_all(&graph);
    let second = resolver.resolve_all(&graph);
    assert_eq!(first, second);
}
