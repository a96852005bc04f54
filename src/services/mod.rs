pub mod stats_catalog;
