pub mod metadata;
pub mod recording_path;
pub mod wav_writer;
