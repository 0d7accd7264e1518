pub mod docdb;
