use ecs_persist::{
    CodecError, Component, ComponentRegistry, ComponentSerializer, FieldCodec, Value,
    WireComponent,
};

#[derive(Debug, Clone, Default, PartialEq, Component)]
struct Transform {
    translation: [f32; 3],
    #[field(skip)]
    dirty: bool,
    _padding: u32,
    #[field(tag = "server_only", tag = "debug")]
    owner: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Component)]
#[component(name = "Label")]
struct DisplayName(String, u8);

#[derive(Debug, Clone, Default, PartialEq, Component)]
struct Marker;

/// Stores a bool as `"yes"` / `"no"`.
struct YesNo;

impl FieldCodec<bool> for YesNo {
    fn encode(&self, raw: &bool) -> Result<Value, CodecError> {
        let text = if *raw { "yes" } else { "no" };
        Ok(Value::String(text.to_owned()))
    }

    fn decode(&self, value: &Value) -> Result<Option<bool>, CodecError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s == "yes" => Ok(Some(true)),
            Value::String(s) if s == "no" => Ok(Some(false)),
            other => Err(CodecError::new(format!("expected yes/no, found {}", other.kind()))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Component)]
struct Toggle {
    #[field(codec = YesNo)]
    on: bool,
}

#[test]
fn named_fields_in_declaration_order() {
    let fields = Transform::field_descriptors();
    let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
    assert_eq!(names, ["translation", "owner"]);
    assert_eq!(Transform::NAME, "Transform");
}

#[test]
fn repeated_tags_accumulate() {
    let fields = Transform::field_descriptors();
    assert_eq!(fields[1].tags(), ["server_only", "debug"]);
    assert!(fields[0].tags().is_empty());
}

#[test]
fn tuple_struct_fields_are_positional() {
    let fields = DisplayName::field_descriptors();
    let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
    assert_eq!(names, ["0", "1"]);
    assert_eq!(DisplayName::NAME, "Label");
}

#[test]
fn unit_struct_has_no_fields() {
    assert!(Marker::field_descriptors().is_empty());
}

#[test]
fn skipped_fields_are_not_serialized() {
    let mut registry = ComponentRegistry::new();
    registry.register::<Transform>().unwrap();
    let serializer = ComponentSerializer::new(registry);

    let transform = Transform {
        translation: [1.0, 2.0, 3.0],
        dirty: true,
        _padding: 5,
        owner: None,
    };
    let wire = serializer.serialize(&transform).unwrap();
    assert_eq!(wire.fields.len(), 1);

    let restored = serializer.deserialize(&wire).unwrap();
    let restored = restored.downcast_ref::<Transform>().unwrap();
    assert_eq!(restored.translation, [1.0, 2.0, 3.0]);
    assert!(!restored.dirty);
    assert_eq!(restored._padding, 0);
}

#[test]
fn renamed_tuple_component_round_trips() {
    let mut registry = ComponentRegistry::new();
    registry.register::<DisplayName>().unwrap();
    registry.register::<Marker>().unwrap();
    let serializer = ComponentSerializer::new(registry);

    let wire = serializer
        .serialize(&DisplayName("Ayla".into(), 3))
        .unwrap();
    assert_eq!(
        wire,
        WireComponent::named("Label")
            .field_value("0", Value::String("Ayla".into()))
            .field_value("1", Value::U64(3))
    );
    let restored = serializer.deserialize(&wire).unwrap();
    assert_eq!(
        restored.downcast_ref::<DisplayName>(),
        Some(&DisplayName("Ayla".into(), 3))
    );

    let marker = serializer.serialize(&Marker).unwrap();
    assert!(marker.fields.is_empty());
    assert!(serializer.deserialize(&marker).unwrap().is::<Marker>());
}

#[test]
fn custom_codec_is_used() {
    let mut registry = ComponentRegistry::new();
    registry.register::<Toggle>().unwrap();
    let serializer = ComponentSerializer::new(registry);

    let wire = serializer.serialize(&Toggle { on: true }).unwrap();
    assert_eq!(wire.field("on"), Some(&Value::String("yes".into())));

    let mut target = Toggle { on: true };
    let bad = WireComponent::named("Toggle").field_value("on", Value::Bool(false));
    let report = serializer.try_deserialize_onto(&mut target, &bad).unwrap();
    assert!(report.is_partial());
    assert!(target.on);

    let good = WireComponent::named("Toggle").field_value("on", Value::String("no".into()));
    serializer.deserialize_onto(&mut target, &good);
    assert!(!target.on);
}
