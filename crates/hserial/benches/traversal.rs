// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Traversal and Streaming Benchmark
//!
//! Measures walk and codec cost over a wide object graph:
//! - Unfiltered depth-first walk
//! - Type-filtered walk with subtree pruning
//! - XML and binary encoding and decoding

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hserial::iter::{TreeIter, TypeIter};
use hserial::object::{Heap, ObjectId};
use hserial::stream::{from_binary, from_xml_str, to_binary, to_xml_string};
use hserial::types::{register_sequence, ClassBuilder, PrimitiveKind, TypeRef, TypeRegistry};
use std::sync::Arc;

struct Fixture {
    heap: Heap,
    root: ObjectId,
    name: TypeRef,
}

/// `Fleet { vehicles: [Vehicle { id, name, position: Point { x, y } }] }`
fn fixture(count: usize) -> Fixture {
    let mut registry = TypeRegistry::new();
    let f64_type = registry.primitive(PrimitiveKind::F64);
    let u32_type = registry.primitive(PrimitiveKind::U32);
    let name = registry.primitive(PrimitiveKind::String);
    let point = ClassBuilder::new("Point")
        .member("x", f64_type)
        .member("y", f64_type)
        .register(&mut registry)
        .expect("point");
    let vehicle = ClassBuilder::new("Vehicle")
        .member("id", u32_type)
        .member("name", name)
        .member("position", point)
        .register(&mut registry)
        .expect("vehicle");
    let vehicles = register_sequence(&mut registry, "Vehicles", vehicle).expect("vehicles");
    let fleet = ClassBuilder::new("Fleet")
        .member("vehicles", vehicles)
        .register(&mut registry)
        .expect("fleet");

    let mut heap = Heap::new(Arc::new(registry));
    let root = heap.create(fleet).expect("root");
    let list = heap.create(vehicles).expect("list");
    for i in 0..count {
        let v = heap.create(vehicle).expect("vehicle");
        heap.set_member_value(v, "id", i as u32).expect("id");
        heap.set_member_value(v, "name", format!("vehicle-{}", i)).expect("name");
        let p = heap.create(point).expect("point");
        heap.set_member_value(p, "x", i as f64).expect("x");
        heap.set_member_value(p, "y", -(i as f64)).expect("y");
        heap.set_member(v, "position", p).expect("position");
        heap.push_element(list, v).expect("push");
    }
    heap.set_member(root, "vehicles", list).expect("vehicles");
    Fixture { heap, root, name }
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");
    for count in [100usize, 1_000, 10_000] {
        let f = fixture(count);
        group.bench_with_input(BenchmarkId::new("all", count), &f, |b, f| {
            b.iter(|| {
                let info = f.heap.begin(f.root).expect("begin");
                let n = TreeIter::walk(&f.heap, info).expect("walk").count();
                black_box(n)
            });
        });
        group.bench_with_input(BenchmarkId::new("strings", count), &f, |b, f| {
            b.iter(|| {
                let info = f.heap.begin(f.root).expect("begin");
                let n = TypeIter::of_type(&f.heap, info, f.name).expect("walk").count();
                black_box(n)
            });
        });
        group.bench_with_input(BenchmarkId::new("detect_loops", count), &f, |b, f| {
            b.iter(|| {
                let info = f.heap.begin_detect_loops(f.root).expect("begin");
                let n = TreeIter::walk(&f.heap, info).expect("walk").count();
                black_box(n)
            });
        });
    }
    group.finish();
}

fn bench_codecs(c: &mut Criterion) {
    let f = fixture(1_000);
    let xml = to_xml_string(&f.heap, f.root).expect("xml");
    let bytes = to_binary(&f.heap, f.root).expect("binary");

    c.bench_function("xml_write_1000", |b| {
        b.iter(|| black_box(to_xml_string(&f.heap, f.root).expect("xml")));
    });
    c.bench_function("xml_read_1000", |b| {
        b.iter(|| {
            let mut heap = Heap::new(f.heap.registry().clone());
            black_box(from_xml_str(&mut heap, &xml).expect("read"))
        });
    });
    c.bench_function("binary_write_1000", |b| {
        b.iter(|| black_box(to_binary(&f.heap, f.root).expect("binary")));
    });
    c.bench_function("binary_read_1000", |b| {
        b.iter(|| {
            let mut heap = Heap::new(f.heap.registry().clone());
            black_box(from_binary(&mut heap, &bytes).expect("read"))
        });
    });
}

criterion_group!(benches, bench_walk, bench_codecs);
criterion_main!(benches);
