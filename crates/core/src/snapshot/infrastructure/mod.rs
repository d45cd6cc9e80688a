pub mod image_file_io;
pub mod label_font;
