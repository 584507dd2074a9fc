pub mod bounded_list;
pub mod config;
pub mod connection_manager;
pub mod layout;
pub mod navigator;
pub mod session;
pub mod sql;
pub mod table_data;
