use super::forward_ref::ForwardRefQueue;
use super::{DrainReport, ForwardRef, MetadataRegistry, TypeMetadata};
use crate::error::MappingError;
use crate::model::Model;
use crate::schema::ModelSchema;

/// The metadata registry together with its queue of pending forward references.
///
/// There is no global instance: create one store per application (or per test)
/// and pass it by reference to whatever converts documents.
#[derive(Debug, Default)]
pub struct MetadataStore {
    registry: MetadataRegistry,
    forward_refs: ForwardRefQueue,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut MetadataRegistry {
        &mut self.registry
    }

    /// Declares `M`: creates its metadata, runs [`Model::describe`] and resolves
    /// whatever forward references were waiting for it.
    ///
    /// Registering the same type twice is a declaration error.
    pub fn register<M: Model>(&mut self) -> Result<&TypeMetadata, MappingError> {
        self.register_with::<M, _>(|_| {})
    }

    /// Like [`register`](Self::register), with extra declarations applied after
    /// the model's own.
    pub fn register_with<M, F>(&mut self, declare: F) -> Result<&TypeMetadata, MappingError>
    where
        M: Model,
        F: FnOnce(&mut ModelSchema<'_, M>),
    {
        self.registry.create::<M>()?;
        {
            let mut schema = ModelSchema::new(self);
            M::describe(&mut schema);
            declare(&mut schema);
        }
        let report = self.drain_forward_refs();
        tracing::debug!(
            model = std::any::type_name::<M>(),
            resolved = report.resolved,
            pending = report.pending,
            "model registered"
        );
        self.registry.get::<M>()
    }

    pub fn get_or_create<M: Model>(&mut self) -> &mut TypeMetadata {
        self.registry.get_or_create::<M>()
    }

    pub fn get<M: Model>(&self) -> Result<&TypeMetadata, MappingError> {
        self.registry.get::<M>()
    }

    /// Queues a forward reference and immediately drains the queue.
    pub fn register_forward_ref(&mut self, forward_ref: ForwardRef) -> DrainReport {
        tracing::trace!(forward_ref = forward_ref.label(), "forward reference queued");
        self.forward_refs.push(forward_ref);
        self.drain_forward_refs()
    }

    pub fn drain_forward_refs(&mut self) -> DrainReport {
        self.forward_refs.drain(&mut self.registry)
    }

    pub fn pending_forward_refs(&self) -> usize {
        self.forward_refs.len()
    }

    /// Labels of the forward references still waiting, in queue order.
    pub fn pending_labels(&self) -> Vec<String> {
        self.forward_refs.labels().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{Post, User};
    use crate::model::{assign_plain, plain_value, FieldValue, TypeKey};
    use crate::relationship::RelationshipKind;

    macro_rules! plain_model {
        ($name:ident) => {
            #[derive(Clone, Debug, Default)]
            struct $name {
                value: String,
            }

            impl Model for $name {
                fn field_names(&self) -> Vec<&'static str> {
                    vec!["value"]
                }

                fn field(&self, name: &str) -> Result<Option<FieldValue>, MappingError> {
                    match name {
                        "value" => plain_value(&self.value).map(Some),
                        _ => Ok(None),
                    }
                }

                fn set_field(&mut self, name: &str, value: FieldValue) -> Result<bool, MappingError> {
                    match name {
                        "value" => assign_plain(&mut self.value, value).map(|_| true),
                        _ => Ok(false),
                    }
                }
            }
        };
    }

    plain_model!(A);
    plain_model!(B);
    plain_model!(C);

    fn link<Owner: Model>(field: &'static str, target: TypeKey) -> ForwardRef {
        ForwardRef::to_type(
            format!("{}.{}", std::any::type_name::<Owner>(), field),
            target,
            move |registry, target| {
                if let Some(metadata) = registry.get_mut_by_key(TypeKey::of::<Owner>()) {
                    metadata
                        .property_mut(field)
                        .set_mapped_to(format!("{}_ref", target.name().len()));
                }
            },
        )
    }

    #[test]
    fn get_unregistered_fails() {
        let store = MetadataStore::new();
        assert!(matches!(
            store.get::<User>(),
            Err(MappingError::NotFoundMetadata { .. })
        ));
    }

    #[test]
    fn get_or_create_registers_plain_fields_once() {
        let mut store = MetadataStore::new();
        let names: Vec<String> = store
            .get_or_create::<User>()
            .properties()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["id", "display_name", "age", "session"]);

        store.get_or_create::<User>().set_collection_name("people");
        assert_eq!(store.registry().len(), 1);
        assert_eq!(store.get::<User>().unwrap().collection_name().unwrap(), "people");
    }

    #[test]
    fn register_twice_is_a_declaration_error() {
        let mut store = MetadataStore::new();
        store.register::<User>().unwrap();
        assert!(matches!(
            store.register::<User>(),
            Err(MappingError::AlreadyRegistered { .. })
        ));
    }

    #[test]
    fn relationship_waits_for_target_registration() {
        let mut store = MetadataStore::new();
        store.register::<Post>().unwrap();

        assert_eq!(store.pending_forward_refs(), 1);
        let author = store.get::<Post>().unwrap().property("author").unwrap();
        assert!(author.relationship().is_none());
        assert!(author.has_custom_conversion());

        store.register::<User>().unwrap();
        assert_eq!(store.pending_forward_refs(), 0);

        let author = store.get::<Post>().unwrap().property("author").unwrap();
        let relationship = author.relationship().unwrap();
        assert_eq!(relationship.kind(), RelationshipKind::ToOne);
        assert_eq!(relationship.target(), TypeKey::of::<User>());
        assert_eq!(relationship.location().to_string(), "../users");
        assert!(author.has_custom_conversion());
    }

    #[test]
    fn circular_refs_resolve_once_all_types_exist() {
        let mut store = MetadataStore::new();

        let report = store.register_forward_ref(link::<A>("value", TypeKey::of::<B>()));
        assert_eq!(report.pending, 1);
        store.register_forward_ref(link::<B>("value", TypeKey::of::<C>()));
        store.register_forward_ref(link::<C>("value", TypeKey::of::<A>()));
        assert_eq!(store.pending_forward_refs(), 3);

        store.get_or_create::<A>();
        store.get_or_create::<B>();
        store.get_or_create::<C>();

        let report = store.drain_forward_refs();
        assert_eq!(report.resolved, 3);
        assert_eq!(report.pending, 0);
        assert!(report.passes <= 3);
        assert_eq!(store.pending_forward_refs(), 0);
        assert!(store.get::<A>().unwrap().property("value").unwrap().mapped_to().is_some());
    }

    #[test]
    fn dependent_refs_resolve_across_passes() {
        let mut store = MetadataStore::new();
        store.get_or_create::<A>();

        // Resolvable once `owner.field` has been remapped by an earlier resolution.
        let waits_for = |owner: TypeKey, field: &'static str| {
            ForwardRef::new(
                format!("waits for {}", field),
                move |registry: &MetadataRegistry| {
                    registry
                        .get_by_key(owner)
                        .ok()
                        .and_then(|metadata| metadata.property(field))
                        .and_then(|property| property.mapped_to())
                        .map(|_| owner)
                },
                |registry: &mut MetadataRegistry, _| {
                    registry
                        .get_or_create::<B>()
                        .property_mut("value")
                        .set_mapped_to("resolved");
                },
            )
        };

        // Queued in reverse dependency order, so every pass resolves exactly one.
        store.forward_refs.push(waits_for(TypeKey::of::<B>(), "value"));
        store.forward_refs.push(waits_for(TypeKey::of::<A>(), "first"));
        store.forward_refs.push(ForwardRef::to_type("seed", TypeKey::of::<A>(), |registry, a| {
            if let Some(metadata) = registry.get_mut_by_key(a) {
                metadata.property_mut("first").set_mapped_to("seeded");
            }
        }));

        let report = store.drain_forward_refs();
        assert_eq!(report.resolved, 3);
        assert_eq!(report.pending, 0);
        assert_eq!(report.passes, 3);
    }

    #[test]
    fn unresolvable_refs_stay_queued() {
        let mut store = MetadataStore::new();
        let report = store.register_forward_ref(link::<A>("value", TypeKey::of::<B>()));
        assert_eq!(report, DrainReport { passes: 1, resolved: 0, pending: 1 });

        let report = store.drain_forward_refs();
        assert_eq!(report.resolved, 0);
        assert_eq!(store.pending_labels().len(), 1);
    }
}
