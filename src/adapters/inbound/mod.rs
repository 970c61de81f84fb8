mod ip_list_file;

pub use ip_list_file::{parse_ip_list, read_ip_list, InputError};
