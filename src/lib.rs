pub mod datesort_core;
