mod discover;

pub use discover::DiscoverBuilder;
