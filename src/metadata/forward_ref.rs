use std::fmt;

use super::MetadataRegistry;
use crate::model::TypeKey;

type Resolver = Box<dyn FnMut(&MetadataRegistry) -> Option<TypeKey> + Send>;
type OnResolve = Box<dyn FnOnce(&mut MetadataRegistry, TypeKey) + Send>;

/// A deferred type lookup, used while a referenced type has no metadata yet.
///
/// `on_resolve` only sees the registry, never the queue: resolving one
/// reference cannot enqueue another or start a nested drain.
pub struct ForwardRef {
    label: String,
    resolver: Resolver,
    on_resolve: OnResolve,
}

impl ForwardRef {
    pub fn new<R, F>(label: impl Into<String>, resolver: R, on_resolve: F) -> Self
    where
        R: FnMut(&MetadataRegistry) -> Option<TypeKey> + Send + 'static,
        F: FnOnce(&mut MetadataRegistry, TypeKey) + Send + 'static,
    {
        Self {
            label: label.into(),
            resolver: Box::new(resolver),
            on_resolve: Box::new(on_resolve),
        }
    }

    /// A reference that resolves once `target` has metadata.
    pub fn to_type<F>(label: impl Into<String>, target: TypeKey, on_resolve: F) -> Self
    where
        F: FnOnce(&mut MetadataRegistry, TypeKey) + Send + 'static,
    {
        Self::new(
            label,
            move |registry: &MetadataRegistry| registry.contains_key(target).then_some(target),
            on_resolve,
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(super) fn try_resolve(&mut self, registry: &MetadataRegistry) -> Option<TypeKey> {
        (self.resolver)(registry)
    }

    pub(super) fn resolve(self, registry: &mut MetadataRegistry, target: TypeKey) {
        (self.on_resolve)(registry, target)
    }
}

impl fmt::Debug for ForwardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardRef").field("label", &self.label).finish()
    }
}

/// Outcome of draining the forward-reference queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Full scans of the queue.
    pub passes: usize,
    pub resolved: usize,
    pub pending: usize,
}

/// FIFO queue of unresolved forward references.
#[derive(Debug, Default)]
pub(super) struct ForwardRefQueue {
    entries: Vec<ForwardRef>,
}

impl ForwardRefQueue {
    pub(super) fn push(&mut self, entry: ForwardRef) {
        self.entries.push(entry);
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(ForwardRef::label)
    }

    /// Scans the queue in order until a full pass resolves nothing.
    ///
    /// Every pass that continues the loop removed at least one entry, so the
    /// drain ends after at most `len + 1` passes.
    pub(super) fn drain(&mut self, registry: &mut MetadataRegistry) -> DrainReport {
        let mut report = DrainReport::default();

        while !self.entries.is_empty() {
            report.passes += 1;
            let before = self.entries.len();
            let mut remaining = Vec::with_capacity(before);

            for mut entry in std::mem::take(&mut self.entries) {
                match entry.try_resolve(registry) {
                    Some(target) => {
                        tracing::trace!(forward_ref = entry.label(), %target, "forward reference resolved");
                        entry.resolve(registry, target);
                    }
                    None => remaining.push(entry),
                }
            }

            let resolved = before - remaining.len();
            self.entries = remaining;
            report.resolved += resolved;
            if resolved == 0 {
                break;
            }
        }

        report.pending = self.entries.len();
        report
    }
}
