pub mod id_range;
