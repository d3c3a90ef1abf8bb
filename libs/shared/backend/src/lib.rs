pub mod docere;

pub use docere::DocereClient;
