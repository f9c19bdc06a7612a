// Paw Memory Journal — Engine
// Everything with side effects lives here: storage, locking, configuration,
// and the tool surface. Pure data and errors live in atoms/.

pub mod config;
pub mod journal;
pub mod paths;
pub mod store;
pub mod tools;
