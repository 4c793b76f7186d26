pub mod excel_read;
pub mod excel_write;
pub mod flatfile;
