// ── Input parsing and display helpers ──

mod format;
mod listing;
mod net;
mod path;
mod ports;

pub use format::format_file_size;
pub use listing::parse_list_line;
pub use net::{is_valid_host, is_valid_hostname, is_valid_ip_range, is_valid_ipv4};
pub use path::next_path;
pub use ports::{COMMON_PORTS, CommonPort, join_ports, merge_ports, parse_ports, port_details};
