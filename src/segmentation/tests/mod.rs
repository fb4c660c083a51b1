pub(crate) mod common;

mod routing;
mod schema;
mod scoring;
