pub mod analytics_db_operations;
pub mod assets_db_operations;
pub mod blocks_db_operations;
pub mod leads_db_operations;
pub mod marketing_db_operations;
pub mod properties_db_operations;
pub mod users_db_operations;
