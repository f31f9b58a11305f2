pub mod collision;
pub mod controls;
pub mod motion;
pub mod outcome;
