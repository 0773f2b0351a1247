pub mod object_download;
pub mod object_list;
pub mod object_upload;
