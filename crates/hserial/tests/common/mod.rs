// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared schema and seeded random graph generator.

#![allow(dead_code)]

use hserial::object::{Heap, ObjectId};
use hserial::types::{
    register_pointer, register_sequence, ChoiceBuilder, ClassBuilder, PrimitiveKind, TypeRef,
    TypeRegistry,
};
use std::collections::HashSet;
use std::sync::Arc;

/// ```text
/// Item  { id: u32, label?: string, kids?: Items, link?: Item*, shape?: Shape }
/// Items = sequence<Item>
/// Shape = choice { radius: f64, name: string }
/// ```
pub struct Schema {
    pub registry: Arc<TypeRegistry>,
    pub item: TypeRef,
    pub items: TypeRef,
    pub link: TypeRef,
    pub shape: TypeRef,
    pub u32_type: TypeRef,
    pub string: TypeRef,
    pub f64_type: TypeRef,
}

pub fn schema() -> Schema {
    let mut registry = TypeRegistry::new();
    let u32_type = registry.primitive(PrimitiveKind::U32);
    let string = registry.primitive(PrimitiveKind::String);
    let f64_type = registry.primitive(PrimitiveKind::F64);
    let item = registry.declare("Item").expect("declare");
    let items = register_sequence(&mut registry, "Items", item).expect("items");
    let link = register_pointer(&mut registry, "ItemRef", Some(item)).expect("link");
    let shape = ChoiceBuilder::new("Shape")
        .variant("radius", f64_type)
        .variant("name", string)
        .register(&mut registry)
        .expect("shape");
    let kind = ClassBuilder::new("Item")
        .member("id", u32_type)
        .optional_member("label", string)
        .optional_member("kids", items)
        .optional_member("link", link)
        .optional_member("shape", shape)
        .build_kind();
    registry.define(item, kind).expect("define");
    registry.validate().expect("valid");
    Schema {
        registry: Arc::new(registry),
        item,
        items,
        link,
        shape,
        u32_type,
        string,
        f64_type,
    }
}

/// Random graph generator.
pub struct Generator<'s> {
    pub schema: &'s Schema,
    pub rng: fastrand::Rng,
    pub next_id: u32,
    /// Free items pointers may target.
    pub targets: Vec<ObjectId>,
    /// Allow pointers back to the root (cycles).
    pub cycles: bool,
}

impl<'s> Generator<'s> {
    pub fn new(schema: &'s Schema, seed: u64) -> Self {
        Self {
            schema,
            rng: fastrand::Rng::with_seed(seed),
            next_id: 0,
            targets: Vec::new(),
            cycles: false,
        }
    }

    pub fn with_cycles(mut self) -> Self {
        self.cycles = true;
        self
    }

    /// Build a random graph and return its root.
    pub fn build(&mut self, heap: &mut Heap, depth: usize) -> ObjectId {
        for _ in 0..self.rng.usize(0..3) {
            let target = self.item(heap, 1, None);
            self.targets.push(target);
        }
        let root = heap.create(self.schema.item).expect("root");
        self.fill(heap, root, depth, Some(root));
        root
    }

    fn item(&mut self, heap: &mut Heap, depth: usize, root: Option<ObjectId>) -> ObjectId {
        let id = heap.create(self.schema.item).expect("item");
        self.fill(heap, id, depth, root);
        id
    }

    fn fill(&mut self, heap: &mut Heap, id: ObjectId, depth: usize, root: Option<ObjectId>) {
        heap.set_member_value(id, "id", self.next_id).expect("id");
        self.next_id += 1;
        if self.rng.bool() {
            let label = format!("item-{}", self.rng.u16(..));
            heap.set_member_value(id, "label", label).expect("label");
        }
        if depth > 0 && self.rng.u8(..) < 180 {
            let kids = heap.create(self.schema.items).expect("kids");
            for _ in 0..self.rng.usize(0..4) {
                let kid = self.item(heap, depth - 1, root);
                heap.push_element(kids, kid).expect("push");
            }
            heap.set_member(id, "kids", kids).expect("set kids");
        }
        let mut candidates = self.targets.clone();
        if self.cycles {
            candidates.extend(root);
        }
        if !candidates.is_empty() && self.rng.u8(..) < 100 {
            let target = candidates[self.rng.usize(..candidates.len())];
            let link = heap.new_pointer(self.schema.link, Some(target)).expect("link");
            heap.set_member(id, "link", link).expect("set link");
        }
        if self.rng.u8(..) < 80 {
            let shape = heap.create(self.schema.shape).expect("shape");
            if self.rng.bool() {
                let radius = heap.new_primitive(self.rng.f64()).expect("radius");
                heap.select_variant(shape, "radius", radius).expect("radius");
            } else {
                let name = heap.new_primitive("round & <square>").expect("name");
                heap.select_variant(shape, "name", name).expect("name");
            }
            heap.set_member(id, "shape", shape).expect("set shape");
        }
    }
}

/// Reference pre-order walk (recursive) used to check the iterators.
pub fn reference_walk(heap: &Heap, root: ObjectId, detect_loops: bool) -> Vec<ObjectId> {
    fn visit(
        heap: &Heap,
        id: ObjectId,
        visited: &mut Option<HashSet<ObjectId>>,
        out: &mut Vec<ObjectId>,
    ) {
        if let Some(visited) = visited.as_mut() {
            if !visited.insert(id) {
                return;
            }
        }
        out.push(id);
        for child in heap.children(id).expect("children") {
            visit(heap, child.id, visited, out);
        }
    }
    let mut visited = detect_loops.then(HashSet::new);
    let mut out = Vec::new();
    visit(heap, root, &mut visited, &mut out);
    out
}
