pub mod smogon;
