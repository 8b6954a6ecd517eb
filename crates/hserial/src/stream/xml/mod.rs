// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML format.
//!
//! The root element is named after the root type. Class members become
//! child elements named after the member (unset members are omitted), a
//! choice holds one element named after its selected variant, and a
//! container holds one element per item. A pointer holds either nothing
//! (null), the target wrapped in an element named after its type with an
//! `id` attribute, or an empty element with a `ref` attribute pointing back
//! to an earlier `id`:
//!
//! ```xml
//! <Node>
//!   <value>1</value>
//!   <next>
//!     <Node id="1">
//!       <value>2</value>
//!       <next>
//!         <Node ref="0"/>
//!       </next>
//!     </Node>
//!   </next>
//! </Node>
//! ```
//!
//! Names that are not plain XML names are carried in attributes of
//! generic `object`, `member` and `variant` elements. Byte strings, and
//! strings holding characters XML 1.0 cannot represent, are written in
//! base64 with `encoding="base64"`.

mod escape;
mod reader;
mod writer;

pub use escape::{escape, escape_attribute, is_xml_name, is_xml_text};
pub use reader::XmlReader;
pub use writer::XmlEncoder;

use crate::config::StreamConfig;
use crate::error::Result;
use crate::object::{Heap, ObjectId};
use crate::stream::ObjectWriter;
use std::io::Write;

/// Comment left in place of the missing content of a failed write.
pub const TRUNCATION_MARK: &str = "output truncated";

pub(crate) const ANONYMOUS_TYPE_TAG: &str = "object";
pub(crate) const ANONYMOUS_MEMBER_TAG: &str = "member";
pub(crate) const ANONYMOUS_VARIANT_TAG: &str = "variant";

/// Write the graph rooted at `root` to `sink`.
pub fn write_xml<W: Write>(heap: &Heap, root: ObjectId, sink: W, config: &StreamConfig) -> Result<W> {
    let mut writer = ObjectWriter::with_config(heap, XmlEncoder::new(sink, config), config);
    writer.write(root)?;
    Ok(writer.into_encoder().into_inner())
}

/// Serialize the graph rooted at `root` with the default configuration.
pub fn to_xml_string(heap: &Heap, root: ObjectId) -> Result<String> {
    to_xml_string_with(heap, root, &StreamConfig::default())
}

pub fn to_xml_string_with(heap: &Heap, root: ObjectId, config: &StreamConfig) -> Result<String> {
    let bytes = write_xml(heap, root, Vec::new(), config)?;
    Ok(String::from_utf8(bytes)?)
}

/// Rebuild an object graph from XML into `heap`, returning the root.
pub fn from_xml_str(heap: &mut Heap, xml: &str) -> Result<ObjectId> {
    XmlReader::default().read(heap, xml)
}

pub fn from_xml_str_with(heap: &mut Heap, xml: &str, config: &StreamConfig) -> Result<ObjectId> {
    XmlReader::new(config).read(heap, xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::object::graph_eq;
    use crate::types::{
        register_pointer, register_sequence, ChoiceBuilder, ClassBuilder, EnumBuilder,
        PrimitiveKind, TypeRef, TypeRegistry,
    };
    use std::sync::Arc;

    struct Schema {
        registry: Arc<TypeRegistry>,
        record: TypeRef,
        tags: TypeRef,
        color: TypeRef,
        payload: TypeRef,
        any: TypeRef,
    }

    fn schema() -> Schema {
        let mut registry = TypeRegistry::new();
        let string = registry.primitive(PrimitiveKind::String);
        let bytes = registry.primitive(PrimitiveKind::Bytes);
        let f64_type = registry.primitive(PrimitiveKind::F64);
        let tags = register_sequence(&mut registry, "Tags", string).expect("tags");
        let color = EnumBuilder::new("Color")
            .variant("RED")
            .variant("GREEN")
            .register(&mut registry)
            .expect("color");
        let payload = ChoiceBuilder::new("Payload")
            .variant("text", string)
            .variant("raw", bytes)
            .register(&mut registry)
            .expect("payload");
        let any = register_pointer(&mut registry, "Any*", None).expect("any");
        let record = ClassBuilder::new("Record")
            .member("name", string)
            .member("score", f64_type)
            .member("tags", tags)
            .member("color", color)
            .optional_member("payload", payload)
            .optional_member("extra", any)
            .register(&mut registry)
            .expect("record");
        Schema {
            registry: Arc::new(registry),
            record,
            tags,
            color,
            payload,
            any,
        }
    }

    fn record(s: &Schema, heap: &mut Heap) -> ObjectId {
        let root = heap.create(s.record).expect("record");
        heap.set_member_value(root, "name", "tab\there & <there>").expect("name");
        heap.set_member_value(root, "score", 0.1f64).expect("score");
        let tags = heap.create(s.tags).expect("tags");
        for tag in ["a", "nul\0inside", ""] {
            let item = heap.new_primitive(tag).expect("tag");
            heap.push_element(tags, item).expect("push");
        }
        heap.set_member(root, "tags", tags).expect("set tags");
        let color = heap.create(s.color).expect("color");
        heap.set_enum(color, "GREEN").expect("green");
        heap.set_member(root, "color", color).expect("set color");
        let payload = heap.create(s.payload).expect("payload");
        let raw = heap.new_primitive(vec![0u8, 255, 10]).expect("raw");
        heap.select_variant(payload, "raw", raw).expect("raw");
        heap.set_member(root, "payload", payload).expect("set payload");
        let target = heap.new_primitive(42u64).expect("target");
        let extra = heap.new_pointer(s.any, Some(target)).expect("extra");
        heap.set_member(root, "extra", extra).expect("set extra");
        root
    }

    #[test]
    fn test_round_trip_all_kinds() {
        let s = schema();
        let mut heap = Heap::new(s.registry.clone());
        let root = record(&s, &mut heap);
        let xml = to_xml_string(&heap, root).expect("write");
        assert!(xml.contains("<color>GREEN</color>"));
        assert!(xml.contains(r#"<raw encoding="base64">AP8K</raw>"#));
        assert!(!xml.contains("Any*"));
        assert!(xml.contains(r#"<u64 id="1">42</u64>"#));

        let mut copy = Heap::new(s.registry.clone());
        let back = from_xml_str(&mut copy, &xml).expect("read");
        assert!(graph_eq(&heap, root, &copy, back).expect("compare"));
    }

    #[test]
    fn test_truncated_output_detected() {
        let s = schema();
        let mut heap = Heap::new(s.registry.clone());
        let root = heap.create(s.record).expect("record");
        heap.set_member_value(root, "name", "partial").expect("name");

        let mut sink = Vec::new();
        let config = StreamConfig::default();
        let mut writer = ObjectWriter::with_config(&heap, XmlEncoder::new(&mut sink, &config), &config);
        assert!(matches!(writer.write(root), Err(Error::MemberNotSet { .. })));
        drop(writer);

        let xml = String::from_utf8(sink).expect("utf8");
        assert!(xml.contains(TRUNCATION_MARK));
        let mut copy = Heap::new(s.registry.clone());
        assert!(matches!(from_xml_str(&mut copy, &xml), Err(Error::Truncated)));
    }

    #[test]
    fn test_reader_rejects_bad_input() {
        let s = schema();
        let mut heap = Heap::new(s.registry.clone());
        assert!(matches!(
            from_xml_str(&mut heap, "<Record><name>x</name"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            from_xml_str(&mut heap, "<Unknown/>"),
            Err(Error::UnknownType(_))
        ));
        assert!(matches!(
            from_xml_str(&mut heap, "<Record><nickname>x</nickname></Record>"),
            Err(Error::UnknownMember { .. })
        ));
        assert!(matches!(
            from_xml_str(&mut heap, "<Record><score>fast</score></Record>"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            from_xml_str(&mut heap, r#"<Record><extra><u64 ref="4"/></extra></Record>"#),
            Err(Error::UnresolvedReference(4))
        ));
    }

    #[test]
    fn test_depth_limit() {
        let s = schema();
        let mut heap = Heap::new(s.registry.clone());
        let config = StreamConfig::default().with_max_depth(1);
        let xml = "<Record><payload><text>deep</text></payload></Record>";
        assert!(matches!(
            from_xml_str_with(&mut heap, xml, &config),
            Err(Error::DepthLimit(1))
        ));
    }

    #[test]
    fn test_whitespace_in_names_round_trips() {
        let mut registry = TypeRegistry::new();
        let i32_type = registry.primitive(PrimitiveKind::I32);
        let row = ClassBuilder::new("Row\tType")
            .member("first\tcol", i32_type)
            .member("second\ncol", i32_type)
            .register(&mut registry)
            .expect("row");
        let mut heap = Heap::new(Arc::new(registry));
        let root = heap.create(row).expect("row");
        heap.set_member_value(root, "first\tcol", 1i32).expect("first");
        heap.set_member_value(root, "second\ncol", 2i32).expect("second");

        let xml = to_xml_string_with(&heap, root, &StreamConfig::compact()).expect("write");
        assert_eq!(
            xml,
            concat!(
                r#"<object type="Row&#9;Type">"#,
                r#"<member name="first&#9;col">1</member>"#,
                r#"<member name="second&#10;col">2</member>"#,
                "</object>"
            )
        );

        let mut copy = Heap::new(heap.registry().clone());
        let back = from_xml_str(&mut copy, &xml).expect("read");
        assert_eq!(copy.member_value(back, "second\ncol").expect("second").as_i64(), Some(2));
        assert!(graph_eq(&heap, root, &copy, back).expect("compare"));
    }
}
