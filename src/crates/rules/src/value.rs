//! Type-erased values passed between functions when a pipeline is executed.
//!
//! The search itself never looks at values, only at declared signatures. Values only flow when
//! a discovered pipeline is materialized.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A single value produced or consumed by a function.
///
/// Cheap to clone: the payload sits behind an `Arc`, so passthrough steps such as downcasts hand
/// the same payload along.
#[derive(Clone)]
pub struct DataInstance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl DataInstance {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Get the payload if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Rust type name of the payload, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both instances share the same payload allocation.
    pub fn same_payload(&self, other: &DataInstance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for DataInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataInstance")
            .field("type", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast() {
        let value = DataInstance::new(42i64);
        assert!(value.is::<i64>());
        assert_eq!(value.downcast_ref::<i64>(), Some(&42));
        assert_eq!(value.downcast_ref::<f64>(), None);
        assert_eq!(value.type_name(), "i64");
    }

    #[test]
    fn test_clone_shares_payload() {
        let value = DataInstance::new(String::from("grass"));
        let copy = value.clone();
        assert!(value.same_payload(&copy));
        assert!(!value.same_payload(&DataInstance::new(String::from("grass"))));
    }
}
