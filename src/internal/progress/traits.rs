pub mod tick_source;
