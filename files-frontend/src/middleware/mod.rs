pub mod guard;

pub use guard::navigation_guard;
