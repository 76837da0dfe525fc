//! Per-call predicates selecting which fields are serialized.

use crate::component::DynComponent;
use crate::field::FieldDescriptor;

/// Decides whether a field takes part in a serialize call.
///
/// Consulted before encoding; fields whose value encodes to null are
/// dropped afterwards regardless of the answer.
pub trait FieldSerializeCheck {
    fn should_serialize(&self, field: &FieldDescriptor, component: &dyn DynComponent) -> bool;
}

/// Serializes every field.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl FieldSerializeCheck for AcceptAll {
    fn should_serialize(&self, _field: &FieldDescriptor, _component: &dyn DynComponent) -> bool {
        true
    }
}

/// Skips fields carrying a tag, e.g. `#[field(tag = "server_only")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludeTagged(pub &'static str);

impl FieldSerializeCheck for ExcludeTagged {
    fn should_serialize(&self, field: &FieldDescriptor, _component: &dyn DynComponent) -> bool {
        !field.has_tag(self.0)
    }
}

impl<F> FieldSerializeCheck for F
where
    F: Fn(&FieldDescriptor, &dyn DynComponent) -> bool,
{
    fn should_serialize(&self, field: &FieldDescriptor, component: &dyn DynComponent) -> bool {
        self(field, component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;

    #[derive(Default)]
    struct Stats {
        level: u32,
        secret: u32,
    }

    impl Component for Stats {
        const NAME: &'static str = "Stats";

        fn field_descriptors() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::new::<Self, u32>("level", |c| &c.level, |c| &mut c.level),
                FieldDescriptor::new::<Self, u32>("secret", |c| &c.secret, |c| &mut c.secret)
                    .with_tags(&["server_only"]),
            ]
        }
    }

    fn accepted(check: &dyn FieldSerializeCheck) -> Vec<&'static str> {
        let stats = Stats::default();
        Stats::field_descriptors()
            .iter()
            .filter(|field| check.should_serialize(field, &stats))
            .map(|field| field.name())
            .collect()
    }

    #[test]
    fn accept_all() {
        assert_eq!(accepted(&AcceptAll), ["level", "secret"]);
    }

    #[test]
    fn exclude_tagged() {
        assert_eq!(accepted(&ExcludeTagged("server_only")), ["level"]);
        assert_eq!(accepted(&ExcludeTagged("other")), ["level", "secret"]);
    }

    #[test]
    fn closure() {
        let check = |field: &FieldDescriptor, _: &dyn DynComponent| field.name() != "level";
        assert_eq!(accepted(&check), ["secret"]);
    }
}
