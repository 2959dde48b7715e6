pub mod linked;
