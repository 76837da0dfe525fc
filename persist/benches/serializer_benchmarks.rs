use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ecs_persist::{Component, ComponentIdTable, ComponentRegistry, ComponentSerializer};

// ---------------------------------------------------------------------------
// Helper component types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Component)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Component)]
struct InventoryComponent {
    owner: Option<String>,
    slots: Vec<u32>,
    gold: u64,
    weight: f32,
}

fn serializer() -> ComponentSerializer {
    let mut registry = ComponentRegistry::new();
    registry.register::<Position>().unwrap();
    registry.register::<InventoryComponent>().unwrap();
    ComponentSerializer::new(registry)
}

fn inventory() -> InventoryComponent {
    InventoryComponent {
        owner: Some("merchant".into()),
        slots: (0..32).collect(),
        gold: 1_250,
        weight: 17.5,
    }
}

// ---------------------------------------------------------------------------
// Serialize
// ---------------------------------------------------------------------------

fn bench_serialize_by_name(c: &mut Criterion) {
    let serializer = serializer();
    let position = Position {
        x: 1.0,
        y: 2.0,
        z: 3.0,
    };
    c.bench_function("serialize_position_by_name", |b| {
        b.iter(|| black_box(serializer.serialize(&position)));
    });
}

fn bench_serialize_by_id(c: &mut Criterion) {
    let serializer = serializer();
    serializer.set_id_mapping(ComponentIdTable::from_registry(serializer.registry()));
    let position = Position {
        x: 1.0,
        y: 2.0,
        z: 3.0,
    };
    c.bench_function("serialize_position_by_id", |b| {
        b.iter(|| black_box(serializer.serialize(&position)));
    });
}

fn bench_serialize_inventory(c: &mut Criterion) {
    let serializer = serializer();
    let inventory = inventory();
    c.bench_function("serialize_inventory", |b| {
        b.iter(|| black_box(serializer.serialize(&inventory)));
    });
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

fn bench_delta_single_change(c: &mut Criterion) {
    let serializer = serializer();
    let base = inventory();
    let delta = InventoryComponent {
        gold: 1_300,
        ..inventory()
    };
    c.bench_function("delta_inventory_single_change", |b| {
        b.iter(|| black_box(serializer.serialize_delta(&base, &delta)));
    });
}

fn bench_delta_no_change(c: &mut Criterion) {
    let serializer = serializer();
    let base = inventory();
    let delta = inventory();
    c.bench_function("delta_inventory_no_change", |b| {
        b.iter(|| black_box(serializer.serialize_delta(&base, &delta)));
    });
}

// ---------------------------------------------------------------------------
// Deserialize
// ---------------------------------------------------------------------------

fn bench_deserialize_inventory(c: &mut Criterion) {
    let serializer = serializer();
    let wire = serializer.serialize(&inventory()).unwrap();
    c.bench_function("deserialize_inventory", |b| {
        b.iter(|| black_box(serializer.deserialize(black_box(&wire))));
    });
}

fn bench_deserialize_onto_position(c: &mut Criterion) {
    let serializer = serializer();
    let wire = serializer
        .serialize(&Position {
            x: 4.0,
            y: 5.0,
            z: 6.0,
        })
        .unwrap();
    let mut target = Position::default();
    c.bench_function("deserialize_onto_position", |b| {
        b.iter(|| {
            serializer.deserialize_onto(&mut target, black_box(&wire));
        });
    });
}

criterion_group!(
    benches,
    bench_serialize_by_name,
    bench_serialize_by_id,
    bench_serialize_inventory,
    bench_delta_single_change,
    bench_delta_no_change,
    bench_deserialize_inventory,
    bench_deserialize_onto_position,
);
criterion_main!(benches);
