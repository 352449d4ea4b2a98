pub mod accumulator;
pub mod ring_reader;
pub mod wav_format;
