mod resolver_map;
pub use resolver_map::ResolverMap;

mod resolver_entry;
pub use resolver_entry::ResolverEntry;

mod fut;
pub use fut::Fut;

mod ready;
pub use ready::Ready;
