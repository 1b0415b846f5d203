pub mod plan;
pub mod run;
pub mod seed_db;
pub mod wait;
