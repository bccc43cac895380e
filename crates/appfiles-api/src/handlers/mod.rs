pub mod app_files;
