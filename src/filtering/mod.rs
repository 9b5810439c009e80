/*! Filtering utilities

Filters decide whether a piece of text is kept.

Filters implement [Filter], [FilterMut] or both:
- [Filter] is implemented for stateless filters (see [CharLength]),
- [FilterMut] is implemented for filters whose decisions depend on what they have already seen
  (see [NearDuplicate]): calling it both tests and records the item.
!*/
mod filter;
mod near_dup;
mod sentence;

pub use filter::Filter;
pub use filter::FilterMut;
pub use near_dup::{char_ngrams, jaccard, NearDuplicate};
pub use sentence::{CharLength, UdhrBoilerplate};
