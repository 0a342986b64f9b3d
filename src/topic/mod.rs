//! Topic resolution - which broker topic an event goes to.
//!
//! ```text
//! event.kind() ──► family ──► TopicMapping ──► base topic ──┐
//!                    │                                      ├──► "{prefix}.{environment}.{base}"
//!                    └─ unmapped ──► kind.derived_base_topic ┘
//! ```
//!
//! The mapping and naming segments are fixed when the resolver is built.
//! Building validates everything up front, so resolving never fails.

mod mapping;
mod resolver;

pub use mapping::TopicMapping;
pub use resolver::{TopicResolver, TopicResolverBuilder, MAX_TOPIC_LEN};
