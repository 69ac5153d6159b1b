//! # Map Generation Tests
//!
//! End-to-end checks of the assembler: determinism, zone bookkeeping,
//! furniture and decoration sanity, street elements and JSON output.

use std::collections::HashSet;

use arcology::procedural::AssetDescriptor;
use arcology::{
    ElementKind, FurnitureCatalog, MapAssembler, MapConfig, MapError, PartitionStrategy,
    SeedInput, StreetStyle, Theme, ZoneKind,
};

fn generate(config: MapConfig) -> arcology::GeneratedMap {
    MapAssembler::new(config)
        .expect("valid config")
        .generate()
        .expect("map generates")
}

/// Test: Two runs with the same seed and config produce identical maps.
#[test]
fn test_generation_is_deterministic() {
    for partition in [PartitionStrategy::Voronoi, PartitionStrategy::Bsp] {
        let config = MapConfig {
            seed: SeedInput::Text("lighthouse".to_string()),
            partition,
            ..MapConfig::default()
        };
        let a = generate(config.clone());
        let b = generate(config);
        assert_eq!(a, b, "{partition:?} maps differ");
    }
}

/// Test: Different seeds produce different maps.
#[test]
fn test_seeds_change_the_map() {
    let a = generate(MapConfig {
        seed: SeedInput::Number(1),
        ..MapConfig::default()
    });
    let b = generate(MapConfig {
        seed: SeedInput::Number(2),
        ..MapConfig::default()
    });
    assert_ne!(a.zones, b.zones);
}

/// Test: Voronoi maps start with the essential rooms and report their counts.
#[test]
fn test_voronoi_zone_bookkeeping() {
    let map = generate(MapConfig::default());

    println!(
        "Zones: {} requested, {} produced (fallback: {})",
        map.report.requested_zones, map.report.produced_zones, map.report.used_fallback
    );
    assert!((6..=13).contains(&map.report.requested_zones));
    assert_eq!(map.report.produced_zones, map.zones.len());
    assert_eq!(map.report.zones.len(), map.zones.len());
    assert!(map.zones.len() >= 4);

    let kinds: Vec<ZoneKind> = map.zones.iter().map(|z| z.kind).collect();
    assert_eq!(&kinds[..4], &ZoneKind::ESSENTIAL);

    let ids: HashSet<&str> = map.zones.iter().map(|z| z.id.as_str()).collect();
    assert_eq!(ids.len(), map.zones.len(), "zone ids must be unique");

    for zone in &map.zones {
        assert!(zone.bounds.width >= 60.0 && zone.bounds.height >= 60.0);
        assert!(zone.bounds.x >= 0.0 && zone.bounds.right() <= 1000.0);
        assert!(zone.bounds.y >= 0.0 && zone.bounds.bottom() <= 600.0);
        assert_eq!(zone.color, Theme::Modern.palette().color(zone.kind.palette_slot()));
    }
}

/// Test: A fixed cell count is honored.
#[test]
fn test_cell_count_override() {
    let map = generate(MapConfig {
        cell_count: Some(5),
        street_style: StreetStyle::None,
        ..MapConfig::default()
    });
    assert_eq!(map.report.requested_zones, 5);
    assert!(map.zones.len() <= 5);
}

/// Test: BSP rooms never overlap and cycle through the room kinds.
#[test]
fn test_bsp_rooms() {
    let map = generate(MapConfig {
        partition: PartitionStrategy::Bsp,
        room_count: 6,
        ..MapConfig::default()
    });

    assert_eq!(map.report.requested_zones, 6);
    assert!(!map.zones.is_empty() && map.zones.len() <= 6);
    assert_eq!(map.zones[0].kind, ZoneKind::Living);

    for (i, a) in map.zones.iter().enumerate() {
        assert!(a.bounds.x >= 50.0 && a.bounds.right() <= 950.0);
        for b in &map.zones[i + 1..] {
            assert!(!a.bounds.overlaps(&b.bounds), "{} overlaps {}", a.id, b.id);
        }
    }
}

/// Test: Furniture stays inside its zone and never shares a cell.
#[test]
fn test_furniture_inside_zones() {
    for seed in 0..5 {
        let map = generate(MapConfig {
            seed: SeedInput::Number(seed),
            furniture_density: 1.0,
            ..MapConfig::default()
        });

        for zone in &map.zones {
            let pieces: Vec<_> = map
                .elements_of(ElementKind::Furniture)
                .filter(|e| e.zone_id.as_deref() == Some(zone.id.as_str()))
                .collect();

            for (i, a) in pieces.iter().enumerate() {
                assert!(a.position.x >= zone.bounds.x - 1e-9);
                assert!(a.position.y >= zone.bounds.y - 1e-9);
                assert!(a.position.x + a.size.width <= zone.bounds.right() + 1e-9);
                assert!(a.position.y + a.size.height <= zone.bounds.bottom() + 1e-9);
                for b in &pieces[i + 1..] {
                    let apart = a.position.x + a.size.width <= b.position.x + 1e-9
                        || b.position.x + b.size.width <= a.position.x + 1e-9
                        || a.position.y + a.size.height <= b.position.y + 1e-9
                        || b.position.y + b.size.height <= a.position.y + 1e-9;
                    assert!(apart, "{} overlaps {}", a.id, b.id);
                }
            }
        }
    }
}

/// Test: Decorations are spaced, inside their zone, and never exceed the
/// zone's decoration list.
#[test]
fn test_decorations() {
    let map = generate(MapConfig::default());
    assert_eq!(map.report.decorations, map.elements_of(ElementKind::Decoration).count());

    for zone in &map.zones {
        let points: Vec<_> = map
            .elements_of(ElementKind::Decoration)
            .filter(|e| e.zone_id.as_deref() == Some(zone.id.as_str()))
            .map(|e| e.position)
            .collect();

        assert!(points.len() <= arcology::decorations(zone.kind).len());
        for (i, a) in points.iter().enumerate() {
            assert!(zone.bounds.contains_point(*a));
            for b in &points[i + 1..] {
                assert!(a.distance(*b) >= 25.0);
            }
        }
    }
}

/// Test: Street styles produce the expected element kinds.
#[test]
fn test_street_styles() {
    let none = generate(MapConfig {
        street_style: StreetStyle::None,
        ..MapConfig::default()
    });
    assert_eq!(none.elements_of(ElementKind::StreetSegment).count(), 0);
    assert!(none.streets.streets.is_empty());

    let simple = generate(MapConfig {
        street_style: StreetStyle::Simple,
        ..MapConfig::default()
    });
    assert_eq!(simple.streets.streets.len(), simple.zones.len() - 1);
    assert_eq!(
        simple.elements_of(ElementKind::StreetSegment).count(),
        simple.streets.streets.iter().map(|s| s.path.len() - 1).sum::<usize>()
    );

    let organic = generate(MapConfig::default());
    println!(
        "Organic: {} streets, {} intersections",
        organic.streets.streets.len(),
        organic.streets.intersections.len()
    );
    assert!(organic.streets.streets.iter().any(|s| s.id == "main"));
    assert_eq!(
        organic.elements_of(ElementKind::Intersection).count(),
        organic.streets.intersections.len()
    );
}

/// Test: Elements come out grouped: furniture, decorations, streets, markers.
#[test]
fn test_element_order() {
    let map = generate(MapConfig::default());
    let rank = |kind: ElementKind| match kind {
        ElementKind::Furniture => 0,
        ElementKind::Decoration => 1,
        ElementKind::StreetSegment => 2,
        ElementKind::Intersection => 3,
    };
    let ranks: Vec<u8> = map.elements.iter().map(|e| rank(e.kind)).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

/// Test: A catalog missing a template's furniture is rejected up front.
#[test]
fn test_incomplete_catalog_rejected() {
    let mut catalog = FurnitureCatalog::standard();
    assert!(catalog.remove("tile_furniture_desk").is_some());
    assert!(matches!(
        MapAssembler::with_catalog(MapConfig::default(), catalog),
        Err(MapError::Procedural(_))
    ));

    let bigger = FurnitureCatalog::standard()
        .with_asset(AssetDescriptor::new("tile_furniture_desk", 64.0, 48.0));
    assert!(MapAssembler::with_catalog(MapConfig::default(), bigger).is_ok());
}

/// Test: The map serializes to JSON with the expected top-level fields.
#[test]
fn test_json_output() {
    let map = generate(MapConfig {
        theme: Theme::Ecological,
        ..MapConfig::default()
    });
    let json = map.to_json(false).expect("serializes");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    for key in ["seed", "zones", "elements", "streets", "report"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    assert_eq!(value["zones"][0]["kind"], "kitchen");
    assert!(value["zones"][0]["effects"]["hunger"].is_number());
}
