pub mod initdb;
pub mod migrate_and_serve;
pub mod reconcile;
pub mod serve;

pub use initdb::init_database;
pub use migrate_and_serve::migrate_and_serve;
pub use reconcile::reconcile;
pub use serve::serve;
