//! Filtering traits.

/// Stateless filter: equal inputs always get equal answers.
///
/// Returns `true` when the item should be kept.
pub trait Filter<T> {
    fn detect(&self, item: T) -> bool;
}

/// Stateful filter.
///
/// The method name differs from [Filter::detect] so that a type can implement both
/// without ambiguity at call sites.
pub trait FilterMut<T> {
    fn detect_mut(&mut self, item: T) -> bool;
}
