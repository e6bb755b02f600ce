use std::fmt;
use std::marker::PhantomData;

/// Marks a field as a nested collection of `T` stored under the owning document.
///
/// Carries no data and is never written to the document; repositories use the
/// field's relationship location to open the nested collection.
pub struct SubCollection<T>(PhantomData<fn() -> T>);

impl<T> Default for SubCollection<T> {
    fn default() -> Self {
        SubCollection(PhantomData)
    }
}

impl<T> Clone for SubCollection<T> {
    fn clone(&self) -> Self {
        SubCollection(PhantomData)
    }
}

impl<T> PartialEq for SubCollection<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> fmt::Debug for SubCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubCollection<{}>", std::any::type_name::<T>())
    }
}
