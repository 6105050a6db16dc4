pub mod backend;
pub mod codec;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod lists;
pub mod logview;
pub mod markup;
pub mod scheduler;
pub mod serialize;
pub mod shell;
pub mod summary;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
