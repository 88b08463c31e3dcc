pub mod creds;
pub mod transports;
