// Raw table readers for weather file formats

pub mod epw_reader;
pub mod simulation_reader;

// Re-export commonly used items
pub use epw_reader::{
    EpwReader, RawImport, RawTableSource, ReadError, ReaderSettings, EPW_HEADER_ROWS,
};
pub use simulation_reader::SimulationReader;
