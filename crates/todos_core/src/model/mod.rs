mod collection;
mod task;

pub use collection::Collection;
pub use task::Task;
