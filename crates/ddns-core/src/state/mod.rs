// # Local State
//
// The updater keeps no state between runs apart from the optional IP
// output file; the provider's zone is the only source of truth.

pub mod ip_file;

pub use ip_file::IpFile;
